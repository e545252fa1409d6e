//! Manifest Fetching
//!
//! The engine downloads manifests through the [`ManifestFetcher`] trait so that
//! hosts can supply their own network stack. Two implementations ship with the
//! crate:
//!
//! - [`HttpManifestFetcher`]: HTTPS downloads via `reqwest` (feature `http-fetcher`)
//! - [`StaticFetcher`]: an in-memory document map for offline use and tests
//!
//! # Feature Flags
//!
//! Without the `http-fetcher` feature, [`HttpManifestFetcher`] still exists but
//! every fetch returns [`WebPayError::Unimplemented`].
//!
//! ```toml
//! [dependencies]
//! webpay-lib = { version = "0.1", features = ["http-fetcher"] }
//! ```

mod config;
mod http;

pub use config::FetcherConfig;
pub use http::HttpManifestFetcher;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{Result, WebPayError};

/// Downloads raw manifest bodies.
///
/// Implementations must be safe to call concurrently; the engine issues
/// several fetches at once.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Fetch the body at `url`.
    ///
    /// Any transport failure, non-success status or oversized body is an error.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// In-memory fetcher serving fixed documents.
///
/// Unknown URLs fail like a `404`. Every call is counted, including failures,
/// so callers can assert how often the network would have been hit.
#[derive(Default)]
pub struct StaticFetcher {
    documents: RwLock<HashMap<Url, Vec<u8>>>,
    failures: RwLock<HashMap<Url, String>>,
    counts: RwLock<HashMap<Url, usize>>,
    delay: Option<Duration>,
}

impl StaticFetcher {
    /// A fetcher with no documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with_document(self, url: Url, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, body);
        self
    }

    /// Fail every fetch of `url` with `reason`.
    pub fn with_failure(self, url: Url, reason: impl Into<String>) -> Self {
        self.fail(url, reason);
        self
    }

    /// Sleep before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `body` at `url`, replacing any document or failure there.
    pub fn insert(&self, url: Url, body: impl Into<Vec<u8>>) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&url);
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url, body.into());
    }

    /// Make `url` fail with `reason`.
    pub fn fail(&self, url: Url, reason: impl Into<String>) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url, reason.into());
    }

    /// Number of fetches of `url` so far.
    pub fn fetch_count(&self, url: &Url) -> usize {
        let counts = self.counts.read().unwrap_or_else(|e| e.into_inner());
        counts.get(url).copied().unwrap_or(0)
    }

    /// Number of fetches of any URL so far.
    pub fn total_fetches(&self) -> usize {
        let counts = self.counts.read().unwrap_or_else(|e| e.into_inner());
        counts.values().sum()
    }

    /// URLs with a document.
    pub fn urls(&self) -> Vec<Url> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        documents.keys().cloned().collect()
    }
}

#[async_trait]
impl ManifestFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        {
            let mut counts = self.counts.write().unwrap_or_else(|e| e.into_inner());
            *counts.entry(url.clone()).or_insert(0) += 1;
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failure = {
            let failures = self.failures.read().unwrap_or_else(|e| e.into_inner());
            failures.get(url).cloned()
        };
        if let Some(reason) = failure {
            return Err(WebPayError::fetch(url, reason));
        }

        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        documents
            .get(url)
            .cloned()
            .ok_or_else(|| WebPayError::fetch(url, "404 Not Found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebPayErrorCode;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_serves_documents_and_counts() {
        let fetcher = StaticFetcher::new().with_document(url("https://bobpay.com/webpay"), "{}");

        assert_eq!(fetcher.fetch(&url("https://bobpay.com/webpay")).await.unwrap(), b"{}");
        assert_eq!(fetcher.fetch_count(&url("https://bobpay.com/webpay")), 1);

        let err = fetcher.fetch(&url("https://alicepay.com/webpay")).await.unwrap_err();
        assert_eq!(err.code(), WebPayErrorCode::Fetch);
        assert!(err.is_retryable());
        assert_eq!(fetcher.total_fetches(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let target = url("https://bobpay.com/webpay");
        let fetcher = StaticFetcher::new()
            .with_document(target.clone(), "{}")
            .with_failure(target.clone(), "connection reset");

        let err = fetcher.fetch(&target).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));

        fetcher.insert(target.clone(), "{}");
        assert!(fetcher.fetch(&target).await.is_ok());
    }

    #[tokio::test]
    async fn test_urls_compare_parsed() {
        let fetcher = StaticFetcher::new().with_document(url("https://BobPay.com"), "{}");
        assert!(fetcher.fetch(&url("https://bobpay.com/")).await.is_ok());
    }
}
