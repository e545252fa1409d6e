//! Discover command - resolve payment apps for requested methods

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use webpay_lib::discovery::{CollectingSink, DiscoveryConfig, DiscoveryEngine, DiscoveryReport};
use webpay_lib::fetcher::{HttpManifestFetcher, ManifestFetcher};

use crate::catalog_file;
use crate::ui;

#[tracing::instrument(skip(config, json, verbose))]
pub async fn run(
    catalogs: &[PathBuf],
    methods: &[String],
    offline: Option<&Path>,
    config: DiscoveryConfig,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let registry = catalog_file::load_registry(catalogs)?;

    let fetcher: Arc<dyn ManifestFetcher> = match offline {
        Some(map) => Arc::new(catalog_file::load_offline_fetcher(map)?),
        None => Arc::new(
            HttpManifestFetcher::new(config.fetcher.clone())
                .context("Failed to create HTTP fetcher")?,
        ),
    };

    let engine = DiscoveryEngine::new(registry, fetcher).with_config(config);
    let sink = CollectingSink::new();

    // Ctrl-C cancels the run
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let spinner = (!json).then(|| ui::spinner("Discovering payment apps..."));
    let report = engine.run(methods, &sink, &cancel).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        ui::json(&report)?;
    } else {
        print_report(&report, verbose);
    }

    if report.is_cancelled() {
        bail!("Discovery cancelled");
    }
    Ok(())
}

fn print_report(report: &DiscoveryReport, verbose: bool) {
    ui::header("Discover Payment Apps");

    for raw in &report.rejected_methods {
        ui::warning(&format!("Ignored invalid method {raw:?}"));
    }
    for url in &report.failed_manifests {
        ui::error(&format!("Could not load manifest {url}"));
    }
    if verbose {
        for method in &report.verified_methods {
            ui::key_value("Manifest loaded", method);
        }
    }

    if report.apps.is_empty() {
        ui::info("No payment apps found");
        return;
    }

    ui::success(&format!("Found {} payment app(s)", report.apps.len()));
    for app in &report.apps {
        ui::separator();
        ui::key_value(&app.app_identifier, &app.label);
        for method in &app.enabled_method_names {
            ui::item(method);
        }
        if verbose && app.ready_to_pay_service {
            ui::item("ready-to-pay service");
        }
    }
}
