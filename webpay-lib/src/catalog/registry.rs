//! App Source Registry
//!
//! Holds the catalogs a discovery engine draws candidates from. A registry is
//! built by the host and passed to the engine; there is no process-wide
//! instance.
//!
//! # Thread Safety
//!
//! The registry uses `RwLock` for thread-safe access. A poisoned lock is
//! recovered rather than propagated, since the guarded data is a plain list
//! that cannot be left half-updated.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::{AppCatalog, InstalledApp};

/// Ordered, named set of app catalogs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use webpay_lib::catalog::{AppSourceRegistry, InstalledApp, StaticCatalog};
///
/// let registry = AppSourceRegistry::new();
/// registry.register("play", Arc::new(StaticCatalog::new().with_app(
///     InstalledApp::new("com.bobpay", 1, "Bob Pay"),
/// )));
/// assert_eq!(registry.len(), 1);
/// ```
pub struct AppSourceRegistry {
    sources: RwLock<Vec<(String, Arc<dyn AppCatalog>)>>,
}

impl AppSourceRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    /// Creates a registry holding a single source.
    pub fn with_source(name: impl Into<String>, source: Arc<dyn AppCatalog>) -> Self {
        let registry = Self::new();
        registry.register(name, source);
        registry
    }

    /// Registers a source.
    ///
    /// A source with the same name is replaced in place, keeping its position.
    pub fn register(&self, name: impl Into<String>, source: Arc<dyn AppCatalog>) {
        let name = name.into();
        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        match sources.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = source,
            None => sources.push((name, source)),
        }
    }

    /// Unregisters a source, returning it if it existed.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn AppCatalog>> {
        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        let index = sources.iter().position(|(n, _)| n == name)?;
        Some(sources.remove(index).1)
    }

    /// Gets a source by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn AppCatalog>> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.clone())
    }

    /// Source names in registration order.
    pub fn names(&self) -> Vec<String> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources.len()
    }

    /// Returns true if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Candidate apps across all sources.
    ///
    /// Sources are queried in registration order and a package seen twice
    /// keeps its first record. Non-candidates are dropped with a debug log.
    pub fn candidate_apps(&self) -> Vec<InstalledApp> {
        let sources: Vec<_> = {
            let guard = self.sources.read().unwrap_or_else(|e| e.into_inner());
            guard.clone()
        };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for (name, source) in sources {
            for app in source.installed_apps() {
                if !seen.insert(app.package_name.clone()) {
                    tracing::debug!(source = %name, package = %app.package_name, "duplicate package ignored");
                    continue;
                }
                if app.is_candidate() {
                    candidates.push(app);
                } else {
                    tracing::debug!(source = %name, package = %app.package_name, "not a payment app candidate");
                }
            }
        }
        candidates
    }
}

impl Default for AppSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AppSourceRegistry {
    fn clone(&self) -> Self {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        Self {
            sources: RwLock::new(sources.clone()),
        }
    }
}
