//! Per-app resolution against fetched manifest chains.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use url::{Origin, Url};

use super::sink::ResolvedPaymentApp;
use crate::catalog::InstalledApp;
use crate::manifest::{PaymentMethodManifest, WebAppManifest};
use crate::methods::{MethodIdentifier, RequestedMethod};
use crate::policy::check_allowed;
use crate::verifier::verifies_app;

/// Manifests fetched during one run, keyed by URL.
#[derive(Default)]
pub(crate) struct ManifestChains {
    pub methods: HashMap<Url, Arc<PaymentMethodManifest>>,
    pub web_apps: HashMap<Url, Arc<WebAppManifest>>,
    /// URLs that failed to fetch or parse.
    pub failed: BTreeSet<Url>,
}

impl ManifestChains {
    /// Whether some web app manifest reachable from `method` verifies `app`.
    fn verifies_default(&self, app: &InstalledApp, method: &Url) -> bool {
        let Some(manifest) = self.methods.get(method) else {
            return false;
        };
        manifest
            .default_applications
            .iter()
            .filter_map(|url| self.web_apps.get(url))
            .any(|web_app| verifies_app(app, web_app))
    }

    /// Method URLs whose chain verifies `app` as default application.
    fn verified_defaults(&self, app: &InstalledApp) -> BTreeSet<&Url> {
        self.methods
            .keys()
            .filter(|method| self.verifies_default(app, method))
            .collect()
    }
}

/// The app's enabled methods, or `None` when nothing is enabled.
pub(crate) fn resolve_app(
    app: &InstalledApp,
    requested: &[RequestedMethod],
    chains: &ManifestChains,
) -> Option<ResolvedPaymentApp> {
    let verified = chains.verified_defaults(app);
    let mut origins: Vec<Origin> = Vec::new();
    for url in &verified {
        let origin = url.origin();
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }

    let mut enabled = BTreeSet::new();
    for method in requested {
        if !app.declares(method) {
            continue;
        }
        match method.identifier() {
            MethodIdentifier::Standard(_) => {
                enabled.insert(method.raw().to_string());
            }
            MethodIdentifier::Url(url) => {
                let Some(manifest) = chains.methods.get(url) else {
                    tracing::debug!(package = %app.package_name, method = %method, "no manifest to check against");
                    continue;
                };
                let is_default = verified.contains(url);
                match check_allowed(
                    app,
                    method.raw(),
                    &origins,
                    &manifest.supported_origins,
                    is_default,
                ) {
                    Ok(()) => {
                        enabled.insert(method.raw().to_string());
                    }
                    Err(err) => tracing::debug!("{err}"),
                }
            }
        }
    }

    if enabled.is_empty() {
        return None;
    }
    Some(ResolvedPaymentApp {
        app_identifier: app.package_name.clone(),
        label: app.label.clone(),
        enabled_method_names: enabled,
        ready_to_pay_service: app.exposes_ready_to_pay_service,
    })
}
