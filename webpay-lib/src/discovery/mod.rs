//! App Discovery
//!
//! [`DiscoveryEngine`] answers one question per run: which installed apps may
//! handle which of the merchant's payment methods?
//!
//! # Pipeline
//!
//! ```text
//! Init ─► ClassifyingMethods ─► FetchingManifests ─► ResolvingApps ─► Completed
//! ```
//!
//! 1. Requested methods are classified; rejected strings are set aside.
//! 2. Method manifests of every URL method are fetched concurrently, then the
//!    web app manifests they reference (each URL once).
//! 3. Every candidate app is checked against the fetched chains and the
//!    origin policy of each requested method.
//! 4. Each app with at least one enabled method is emitted, then completion.
//!
//! A failed fetch or parse only disables the methods that depended on it.
//! Nothing inside a run is retried.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use webpay_lib::catalog::{AppSourceRegistry, InstalledApp, StaticCatalog};
//! use webpay_lib::discovery::DiscoveryEngine;
//! use webpay_lib::fetcher::StaticFetcher;
//!
//! # futures::executor::block_on(async {
//! let catalog = StaticCatalog::new().with_app(
//!     InstalledApp::new("com.cardapp", 1, "Card App")
//!         .with_signing_certificate(b"cert")
//!         .with_supported_method("basic-card"),
//! );
//! let engine = DiscoveryEngine::new(
//!     AppSourceRegistry::with_source("installed", Arc::new(catalog)),
//!     Arc::new(StaticFetcher::new()),
//! );
//!
//! let apps = engine.discover(&["basic-card"]).await;
//! assert_eq!(apps[0].app_identifier, "com.cardapp");
//! # });
//! ```

mod resolve;
pub mod sink;

pub use sink::{ChannelSink, CollectingSink, DiscoveryEvent, ResolvedPaymentApp, ResultSink};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use self::resolve::{resolve_app, ManifestChains};
use crate::catalog::{AppSourceRegistry, InstalledApp};
use crate::fetcher::{FetcherConfig, ManifestFetcher};
use crate::manifest::{parse_method_manifest, parse_web_app_manifest};
use crate::methods::{
    classify, classify_requested, is_secure_url, MethodIdentifier, RequestedMethod,
};
use crate::{Result, WebPayError};

/// Phase of a discovery run. Phases only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryState {
    /// Nothing has happened yet.
    Init,
    /// Requested methods are being classified.
    ClassifyingMethods,
    /// Manifests are being downloaded and parsed.
    FetchingManifests,
    /// Candidate apps are being checked and emitted.
    ResolvingApps,
    /// All work settled and completion was signalled.
    Completed,
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::ClassifyingMethods => "classifying_methods",
            Self::FetchingManifests => "fetching_manifests",
            Self::ResolvingApps => "resolving_apps",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryOutcome {
    /// Every result was emitted, followed by completion.
    Completed,
    /// The run was cancelled; no completion was signalled.
    Cancelled,
}

/// Summary of one run, returned alongside the sink events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// How the run ended.
    pub outcome: DiscoveryOutcome,
    /// Last phase reached.
    pub state: DiscoveryState,
    /// Apps emitted, in emission order.
    pub apps: Vec<ResolvedPaymentApp>,
    /// Requested URL methods whose manifest was fetched and parsed.
    pub verified_methods: BTreeSet<String>,
    /// Manifest URLs that failed to fetch or parse.
    pub failed_manifests: BTreeSet<Url>,
    /// Requested strings that were not valid method identifiers.
    pub rejected_methods: Vec<String>,
}

impl DiscoveryReport {
    fn new() -> Self {
        Self {
            outcome: DiscoveryOutcome::Completed,
            state: DiscoveryState::Init,
            apps: Vec::new(),
            verified_methods: BTreeSet::new(),
            failed_manifests: BTreeSet::new(),
            rejected_methods: Vec::new(),
        }
    }

    fn enter(&mut self, next: DiscoveryState) {
        debug_assert!(next > self.state, "{} -> {}", self.state, next);
        tracing::debug!(from = %self.state, to = %next, "discovery state");
        self.state = next;
    }

    fn cancelled(mut self) -> Self {
        tracing::debug!(state = %self.state, "discovery cancelled");
        self.outcome = DiscoveryOutcome::Cancelled;
        self
    }

    /// True when the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.outcome == DiscoveryOutcome::Cancelled
    }
}

impl DiscoveryOutcome {
    /// `Err(Cancelled)` for a cancelled run.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Completed => Ok(()),
            Self::Cancelled => Err(WebPayError::Cancelled),
        }
    }
}

/// Engine settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Settings for the HTTP fetcher a host builds from this config.
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Fetches in flight at once. Values below 1 are treated as 1.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_max_concurrent_fetches() -> usize {
    8
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl DiscoveryConfig {
    /// Set the fetcher settings.
    pub fn with_fetcher(mut self, fetcher: FetcherConfig) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Set the concurrency limit.
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    /// The concurrency limit actually applied.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<()> {
        self.fetcher.validate()
    }
}

/// Resolves installed payment apps for a merchant's requested methods.
///
/// The engine holds no per-run state. Each [`run`](Self::run) fetches every
/// manifest it needs afresh, once per URL, so manifest changes made between
/// runs are always seen.
pub struct DiscoveryEngine {
    registry: AppSourceRegistry,
    fetcher: Arc<dyn ManifestFetcher>,
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    /// Create an engine over `registry` that downloads through `fetcher`.
    pub fn new(registry: AppSourceRegistry, fetcher: Arc<dyn ManifestFetcher>) -> Self {
        Self {
            registry,
            fetcher,
            config: DiscoveryConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: DiscoveryConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// The app sources consulted by each run.
    pub fn registry(&self) -> &AppSourceRegistry {
        &self.registry
    }

    /// Run discovery, delivering results to `sink`.
    ///
    /// Never fails: every fetch, parse, verification or policy failure only
    /// removes the affected method/app pairs from the result. If `cancel`
    /// fires, in-flight fetches are dropped, nothing further is emitted and
    /// the report's outcome is [`DiscoveryOutcome::Cancelled`].
    #[tracing::instrument(skip_all, fields(methods = requested.len()))]
    pub async fn run<S: AsRef<str>>(
        &self,
        requested: &[S],
        sink: &dyn ResultSink,
        cancel: &CancellationToken,
    ) -> DiscoveryReport {
        let mut report = DiscoveryReport::new();

        report.enter(DiscoveryState::ClassifyingMethods);
        let classified = classify_requested(requested.iter().map(|m| m.as_ref().to_string()));
        report.rejected_methods = classified.rejected;
        let requested = classified.accepted;

        let candidates = self.registry.candidate_apps();
        tracing::debug!(
            methods = requested.len(),
            candidates = candidates.len(),
            "starting discovery"
        );

        report.enter(DiscoveryState::FetchingManifests);
        let method_urls = manifest_urls_to_fetch(&requested, &candidates);
        let chains = tokio::select! {
            biased;
            _ = cancel.cancelled() => return report.cancelled(),
            chains = self.fetch_chains(method_urls) => chains,
        };
        report.failed_manifests = chains.failed.clone();
        report.verified_methods = requested
            .iter()
            .filter(|m| m.url().is_some_and(|url| chains.methods.contains_key(url)))
            .map(|m| m.raw().to_string())
            .collect();

        report.enter(DiscoveryState::ResolvingApps);
        let mut resolved: Vec<_> = candidates
            .iter()
            .filter_map(|app| resolve_app(app, &requested, &chains))
            .collect();
        resolved.sort_by(|a, b| a.app_identifier.cmp(&b.app_identifier));

        for app in resolved {
            if cancel.is_cancelled() {
                return report.cancelled();
            }
            report.apps.push(app.clone());
            sink.on_app_resolved(app);
        }

        report.enter(DiscoveryState::Completed);
        sink.on_complete();
        tracing::info!(
            apps = report.apps.len(),
            verified_methods = report.verified_methods.len(),
            failed_manifests = report.failed_manifests.len(),
            "discovery complete"
        );
        report
    }

    /// Run to completion and return the emitted apps.
    pub async fn discover<S: AsRef<str>>(&self, requested: &[S]) -> Vec<ResolvedPaymentApp> {
        let sink = CollectingSink::new();
        self.run(requested, &sink, &CancellationToken::new()).await;
        sink.take_apps()
    }

    /// Fetch method manifests, then the web app manifests they reference.
    async fn fetch_chains(&self, method_urls: BTreeSet<Url>) -> ManifestChains {
        let mut chains = ManifestChains::default();

        for (url, result) in self.fetch_all(method_urls, parse_method_manifest).await {
            match result {
                Ok(manifest) => {
                    chains.methods.insert(url, Arc::new(manifest));
                }
                Err(err) => {
                    tracing::warn!("{err}");
                    chains.failed.insert(url);
                }
            }
        }

        let web_app_urls: BTreeSet<Url> = chains
            .methods
            .values()
            .flat_map(|manifest| manifest.default_applications.iter().cloned())
            .collect();
        let mut pending = BTreeSet::new();
        for url in web_app_urls {
            if is_secure_url(&url) {
                pending.insert(url);
            } else {
                tracing::warn!(url = %url, "skipping web app manifest on insecure URL");
                chains.failed.insert(url);
            }
        }
        for (url, result) in self.fetch_all(pending, parse_web_app_manifest).await {
            match result {
                Ok(manifest) => {
                    if manifest.is_inert() {
                        tracing::debug!(url = %url, "web app manifest names no play app");
                    }
                    chains.web_apps.insert(url, Arc::new(manifest));
                }
                Err(err) => {
                    tracing::warn!("{err}");
                    chains.failed.insert(url);
                }
            }
        }

        chains
    }

    /// Fetch and parse each of `urls` once with bounded concurrency, in
    /// completion order.
    async fn fetch_all<T>(
        &self,
        urls: BTreeSet<Url>,
        parse: fn(&[u8]) -> Result<T>,
    ) -> Vec<(Url, Result<T>)> {
        stream::iter(urls)
            .map(|url| async move {
                tracing::debug!(url = %url, "fetching manifest");
                let result = match self.fetcher.fetch(&url).await {
                    Ok(body) => parse(&body),
                    Err(err) => Err(err),
                };
                (url, result)
            })
            .buffer_unordered(self.config.effective_concurrency())
            .collect()
            .await
    }
}

/// Method manifests needed to resolve `requested` for `candidates`.
///
/// Besides the requested URL methods this includes each candidate's own URL
/// default method when the candidate also declares another requested URL
/// method, since being verified there gives the app its home origin.
fn manifest_urls_to_fetch(
    requested: &[RequestedMethod],
    candidates: &[InstalledApp],
) -> BTreeSet<Url> {
    let mut urls: BTreeSet<Url> = requested.iter().filter_map(|m| m.url().cloned()).collect();

    for app in candidates {
        let Some(default) = app.default_method() else {
            continue;
        };
        let Ok(MethodIdentifier::Url(home)) = classify(default) else {
            continue;
        };
        let needs_origin = requested
            .iter()
            .any(|m| m.url().is_some_and(|url| *url != home) && app.declares(m));
        if needs_origin {
            urls.insert(home);
        }
    }
    urls
}

impl fmt::Debug for DiscoveryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryEngine")
            .field("sources", &self.registry.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::fetcher::StaticFetcher;
    use crate::verifier::Fingerprint;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn engine(apps: Vec<InstalledApp>, fetcher: Arc<StaticFetcher>) -> DiscoveryEngine {
        let catalog: StaticCatalog = apps.into_iter().collect();
        DiscoveryEngine::new(
            AppSourceRegistry::with_source("installed", Arc::new(catalog)),
            fetcher,
        )
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(DiscoveryState::Init < DiscoveryState::ClassifyingMethods);
        assert!(DiscoveryState::ResolvingApps < DiscoveryState::Completed);
        assert_eq!(DiscoveryState::FetchingManifests.to_string(), "fetching_manifests");
    }

    #[test]
    fn test_config_defaults() {
        let config: DiscoveryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DiscoveryConfig::default());
        assert_eq!(config.max_concurrent_fetches, 8);
        assert_eq!(config.with_max_concurrent_fetches(0).effective_concurrency(), 1);
    }

    #[test]
    fn test_home_method_fetched_only_when_needed() {
        let app = InstalledApp::new("com.bobpay", 1, "Bob Pay")
            .with_signing_fingerprint(Fingerprint::new([1; 32]))
            .with_default_method("https://bobpay.com/webpay")
            .with_supported_method("https://alicepay.com/webpay");

        let requested = classify_requested(["https://alicepay.com/webpay"]).accepted;
        let urls = manifest_urls_to_fetch(&requested, std::slice::from_ref(&app));
        assert!(urls.contains(&url("https://bobpay.com/webpay")));

        let requested = classify_requested(["basic-card"]).accepted;
        assert!(manifest_urls_to_fetch(&requested, &[app]).is_empty());
    }

    #[tokio::test]
    async fn test_report_tracks_rejected_and_state() {
        let fetcher = Arc::new(StaticFetcher::new());
        let engine = engine(vec![], fetcher.clone());
        let sink = CollectingSink::new();

        let report = engine
            .run(&["bogus", "basic-card"], &sink, &CancellationToken::new())
            .await;

        assert_eq!(report.outcome, DiscoveryOutcome::Completed);
        assert_eq!(report.state, DiscoveryState::Completed);
        assert_eq!(report.rejected_methods, vec!["bogus"]);
        assert!(sink.is_complete());
        assert_eq!(fetcher.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_each_run_refetches_manifests() {
        let method = url("https://bobpay.com/webpay");
        let fetcher = Arc::new(
            StaticFetcher::new().with_document(method.clone(), r#"{"supported_origins": "*"}"#),
        );
        let engine = engine(vec![], fetcher.clone());

        engine.discover(&["https://bobpay.com/webpay", "https://bobpay.com/webpay"]).await;
        assert_eq!(fetcher.fetch_count(&method), 1);

        engine.discover(&["https://bobpay.com/webpay"]).await;
        assert_eq!(fetcher.fetch_count(&method), 2);
    }

    #[test]
    fn test_outcome_into_result() {
        assert!(DiscoveryOutcome::Completed.into_result().is_ok());
        let err = DiscoveryOutcome::Cancelled.into_result().unwrap_err();
        assert_eq!(err.code(), crate::WebPayErrorCode::Cancelled);
    }
}
