//! HTTPS manifest fetcher.
//!
//! Requires the `http-fetcher` feature for actual requests. Without it, every
//! fetch returns an `Unimplemented` error.

use async_trait::async_trait;
#[cfg(feature = "http-fetcher")]
use std::time::Duration;
use url::Url;

use super::{FetcherConfig, ManifestFetcher};
use crate::methods::is_secure_url;
use crate::{Result, WebPayError};

#[cfg(not(feature = "http-fetcher"))]
const STUB_FEATURE: &str = "HTTP manifest fetcher (enable the 'http-fetcher' feature)";

/// Downloads manifests over HTTPS.
///
/// Only secure URLs are fetched, before and after redirects. Bodies larger
/// than [`FetcherConfig::max_manifest_bytes`] are rejected while streaming.
pub struct HttpManifestFetcher {
    config: FetcherConfig,
    #[cfg(feature = "http-fetcher")]
    client: reqwest::Client,
}

impl HttpManifestFetcher {
    /// Create a fetcher with the given configuration.
    #[cfg(feature = "http-fetcher")]
    pub fn new(config: FetcherConfig) -> Result<Self> {
        config.validate()?;

        let max_redirects = config.max_redirects;
        let redirect = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error("too many redirects")
            } else if !is_secure_url(attempt.url()) {
                attempt.error("redirect to insecure URL")
            } else {
                attempt.follow()
            }
        });

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| WebPayError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a fetcher with the given configuration (stub when feature disabled).
    #[cfg(not(feature = "http-fetcher"))]
    pub fn new(config: FetcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    #[cfg(feature = "http-fetcher")]
    fn map_reqwest_error(&self, url: &Url, err: reqwest::Error) -> WebPayError {
        if err.is_timeout() {
            WebPayError::FetchTimeout {
                url: url.to_string(),
                timeout_ms: self.config.timeout_ms(),
            }
        } else if err.is_redirect() {
            WebPayError::fetch(url, format!("redirect rejected: {}", err))
        } else {
            WebPayError::fetch(url, err.to_string())
        }
    }

    #[cfg(feature = "http-fetcher")]
    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;

        if !is_secure_url(response.url()) {
            return Err(WebPayError::fetch(url, "response came from an insecure URL"));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(WebPayError::fetch(url, format!("HTTP {}", status)));
        }

        let limit = self.config.max_manifest_bytes;
        if let Some(length) = response.content_length() {
            if length > limit as u64 {
                return Err(WebPayError::fetch(
                    url,
                    format!("manifest of {} bytes exceeds limit of {}", length, limit),
                ));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(WebPayError::fetch(
                    url,
                    format!("manifest exceeds limit of {} bytes", limit),
                ));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    #[cfg(not(feature = "http-fetcher"))]
    async fn download(&self, _url: &Url) -> Result<Vec<u8>> {
        Err(WebPayError::Unimplemented(STUB_FEATURE))
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    #[tracing::instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        if !is_secure_url(url) {
            return Err(WebPayError::fetch(url, "refusing to fetch an insecure URL"));
        }
        let body = self.download(url).await?;
        tracing::debug!(bytes = body.len(), "manifest downloaded");
        Ok(body)
    }
}
