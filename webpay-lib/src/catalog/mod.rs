//! Installed Application Catalog
//!
//! The engine never talks to a package manager directly. Hosts expose their
//! installed apps through the read-only [`AppCatalog`] trait and register one
//! or more catalogs in an [`AppSourceRegistry`] handed to the engine.
//!
//! # Candidacy
//!
//! An app takes part in discovery only if it has a label, at least one
//! signing fingerprint and some payment metadata (a default method or a
//! supported-method list). Apps that only expose the ready-to-pay service are
//! discoverable but never candidates.

mod registry;

pub use registry::AppSourceRegistry;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::methods::RequestedMethod;
use crate::verifier::Fingerprint;

/// Snapshot of one installed native app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    /// Package name, e.g. `com.bobpay`.
    pub package_name: String,
    /// Installed version code.
    pub version_code: i64,
    /// Human-readable name. Empty disqualifies the app.
    pub label: String,
    /// SHA-256 fingerprints of the app's signing certificates.
    #[serde(default)]
    pub signing_fingerprints: BTreeSet<Fingerprint>,
    /// Default payment method metadata. Empty is treated as absent.
    #[serde(default)]
    pub default_method_name: Option<String>,
    /// Additional payment methods the app declares.
    #[serde(default)]
    pub supported_method_names: BTreeSet<String>,
    /// Whether the app exposes the "ready to pay" query service.
    #[serde(default)]
    pub exposes_ready_to_pay_service: bool,
}

impl InstalledApp {
    /// An app with no signatures and no payment metadata.
    pub fn new(package_name: impl Into<String>, version_code: i64, label: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            version_code,
            label: label.into(),
            signing_fingerprints: BTreeSet::new(),
            default_method_name: None,
            supported_method_names: BTreeSet::new(),
            exposes_ready_to_pay_service: false,
        }
    }

    /// Add a signing certificate; its SHA-256 fingerprint is recorded.
    pub fn with_signing_certificate(mut self, certificate: &[u8]) -> Self {
        self.signing_fingerprints
            .insert(Fingerprint::of_certificate(certificate));
        self
    }

    /// Add a precomputed signing fingerprint.
    pub fn with_signing_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.signing_fingerprints.insert(fingerprint);
        self
    }

    /// Set the default payment method metadata.
    pub fn with_default_method(mut self, method: impl Into<String>) -> Self {
        self.default_method_name = Some(method.into());
        self
    }

    /// Add a supported payment method name.
    pub fn with_supported_method(mut self, method: impl Into<String>) -> Self {
        self.supported_method_names.insert(method.into());
        self
    }

    /// Mark the ready-to-pay service as exposed.
    pub fn with_ready_to_pay_service(mut self) -> Self {
        self.exposes_ready_to_pay_service = true;
        self
    }

    /// The default method, with empty metadata treated as absent.
    pub fn default_method(&self) -> Option<&str> {
        self.default_method_name.as_deref().filter(|m| !m.is_empty())
    }

    /// Default method followed by supported methods.
    pub fn declared_method_names(&self) -> impl Iterator<Item = &str> {
        self.default_method()
            .into_iter()
            .chain(self.supported_method_names.iter().map(String::as_str))
            .filter(|m| !m.is_empty())
    }

    /// Whether the app declares `method` as its default or a supported method.
    pub fn declares(&self, method: &RequestedMethod) -> bool {
        self.declared_method_names()
            .any(|declared| method.matches_declared(declared))
    }

    /// Whether the app takes part in discovery at all.
    pub fn is_candidate(&self) -> bool {
        !self.label.is_empty()
            && !self.signing_fingerprints.is_empty()
            && self.declared_method_names().next().is_some()
    }
}

/// Read-only view of the platform's installed apps.
pub trait AppCatalog: Send + Sync {
    /// Package names of every installed app that may handle payments.
    fn package_names(&self) -> Vec<String>;

    /// Current details for one package, if still installed.
    fn app(&self, package_name: &str) -> Option<InstalledApp>;

    /// Every app listed by [`package_names`](Self::package_names).
    fn installed_apps(&self) -> Vec<InstalledApp> {
        self.package_names()
            .iter()
            .filter_map(|name| self.app(name))
            .collect()
    }
}

/// Fixed in-memory catalog.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    apps: BTreeMap<String, InstalledApp>,
}

impl StaticCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an app.
    pub fn with_app(mut self, app: InstalledApp) -> Self {
        self.insert(app);
        self
    }

    /// Add or replace an app.
    pub fn insert(&mut self, app: InstalledApp) {
        self.apps.insert(app.package_name.clone(), app);
    }

    /// Remove an app by package name.
    pub fn remove(&mut self, package_name: &str) -> Option<InstalledApp> {
        self.apps.remove(package_name)
    }

    /// Number of apps.
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl FromIterator<InstalledApp> for StaticCatalog {
    fn from_iter<T: IntoIterator<Item = InstalledApp>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for app in iter {
            catalog.insert(app);
        }
        catalog
    }
}

impl AppCatalog for StaticCatalog {
    fn package_names(&self) -> Vec<String> {
        self.apps.keys().cloned().collect()
    }

    fn app(&self, package_name: &str) -> Option<InstalledApp> {
        self.apps.get(package_name).cloned()
    }
}
