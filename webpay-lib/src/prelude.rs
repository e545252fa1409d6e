//! Prelude module for convenient imports.
//!
//! ```rust
//! use webpay_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Error types: `WebPayError`, `WebPayErrorCode`, `Result`
//! - Method classification: `classify`, `RequestedMethod`, `MethodIdentifier`
//! - Catalog: `InstalledApp`, `AppCatalog`, `StaticCatalog`, `AppSourceRegistry`
//! - Fetching: `ManifestFetcher`, `StaticFetcher`, `HttpManifestFetcher`
//! - Discovery: `DiscoveryEngine`, `DiscoveryConfig`, result sinks

// Error handling
pub use crate::errors::{WebPayError, WebPayErrorCode};
pub use crate::Result;

// Methods
pub use crate::methods::{classify, MethodIdentifier, RequestedMethod, StandardMethod};

// Catalog
pub use crate::catalog::{AppCatalog, AppSourceRegistry, InstalledApp, StaticCatalog};

// Manifests and verification
pub use crate::manifest::{PaymentMethodManifest, SupportedOrigins, WebAppManifest};
pub use crate::verifier::Fingerprint;

// Fetching
pub use crate::fetcher::{FetcherConfig, HttpManifestFetcher, ManifestFetcher, StaticFetcher};

// Discovery
pub use crate::discovery::{
    CollectingSink, DiscoveryConfig, DiscoveryEngine, DiscoveryOutcome, DiscoveryReport,
    ResolvedPaymentApp, ResultSink,
};
