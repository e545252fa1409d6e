//! WebPay library.
//!
//! Decides which natively installed payment apps a web payment request may
//! offer, and for which of the merchant's payment methods. Trust comes from
//! manifests hosted at the payment method URLs: they name each method's
//! default applications by package and signing-certificate fingerprint, and
//! list the other origins allowed to use the method.
//!
//! The crate owns no platform state. Installed apps come in through the
//! [`catalog::AppCatalog`] trait, manifests through [`fetcher::ManifestFetcher`]
//! and results leave through [`discovery::ResultSink`].
//!
//! # Features
//!
//! - **Method Classification**: Registered tokens and secure URL methods
//! - **Manifest Parsing**: Payment method and web app manifests
//! - **Fingerprint Verification**: Package, version and certificate checks
//! - **Origin Policy**: Wildcard, origin list and default-application rules
//! - **Concurrent Discovery**: Bounded parallel fetches with cancellation
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use webpay_lib::prelude::*;
//! use url::Url;
//!
//! # futures::executor::block_on(async {
//! let cert = b"bobpay signing certificate";
//! let fingerprint = Fingerprint::of_certificate(cert);
//!
//! let fetcher = StaticFetcher::new()
//!     .with_document(
//!         Url::parse("https://bobpay.com/webpay").unwrap(),
//!         r#"{"default_applications": ["https://bobpay.com/app.json"]}"#,
//!     )
//!     .with_document(
//!         Url::parse("https://bobpay.com/app.json").unwrap(),
//!         format!(
//!             r#"{{"related_applications": [{{"platform": "play", "id": "com.bobpay",
//!                 "fingerprints": [{{"type": "sha256_cert", "value": "{fingerprint}"}}]}}]}}"#
//!         ),
//!     );
//!
//! let catalog = StaticCatalog::new().with_app(
//!     InstalledApp::new("com.bobpay", 1, "Bob Pay")
//!         .with_signing_certificate(cert)
//!         .with_default_method("https://bobpay.com/webpay"),
//! );
//!
//! let engine = DiscoveryEngine::new(
//!     AppSourceRegistry::with_source("installed", Arc::new(catalog)),
//!     Arc::new(fetcher),
//! );
//! let apps = engine.discover(&["https://bobpay.com/webpay"]).await;
//! assert_eq!(apps.len(), 1);
//! assert_eq!(apps[0].app_identifier, "com.bobpay");
//! # });
//! ```

pub mod catalog;
pub mod discovery;
pub mod errors;
pub mod fetcher;
pub mod manifest;
pub mod methods;
pub mod policy;
pub mod prelude;
pub mod verifier;

pub use errors::{ManifestKind, WebPayError, WebPayErrorCode};

/// Common result alias for WebPay operations.
pub type Result<T> = std::result::Result<T, WebPayError>;
