//! Parse-manifest command - validate a manifest file

use std::path::Path;

use anyhow::{Context, Result};
use webpay_lib::manifest::{parse_method_manifest, parse_web_app_manifest, SupportedOrigins};

use crate::ui;
use crate::ManifestKindArg;

pub fn run(file: &Path, kind: ManifestKindArg, verbose: bool) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    match kind {
        ManifestKindArg::Method => {
            let manifest = parse_method_manifest(&bytes)?;
            ui::header("Payment Method Manifest");

            ui::key_value(
                "Default applications",
                &manifest.default_applications.len().to_string(),
            );
            for url in &manifest.default_applications {
                ui::item(url.as_str());
            }

            match &manifest.supported_origins {
                SupportedOrigins::All => ui::key_value("Supported origins", "*"),
                SupportedOrigins::Set(origins) => {
                    ui::key_value("Supported origins", &origins.len().to_string());
                    let mut origins: Vec<_> =
                        origins.iter().map(|o| o.ascii_serialization()).collect();
                    origins.sort();
                    for origin in origins {
                        ui::item(&origin);
                    }
                }
            }
        }
        ManifestKindArg::WebApp => {
            let manifest = parse_web_app_manifest(&bytes)?;
            ui::header("Web App Manifest");

            ui::key_value(
                "Related applications",
                &manifest.related_applications.len().to_string(),
            );
            for app in &manifest.related_applications {
                ui::separator();
                ui::key_value("Platform", &app.platform);
                ui::key_value("Package", &app.package_id);
                if let Some(min_version) = app.min_version {
                    ui::key_value("Min version", &min_version.to_string());
                }
                ui::key_value("Fingerprints", &app.fingerprints.len().to_string());
                if verbose {
                    for fingerprint in &app.fingerprints {
                        ui::item(&fingerprint.to_string());
                    }
                }
            }

            if manifest.is_inert() {
                ui::warning("No entry can verify an installed app");
            }
        }
    }

    ui::success("Manifest is valid");
    Ok(())
}
