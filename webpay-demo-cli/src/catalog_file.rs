//! On-disk formats for the `discover` command.
//!
//! A catalog file lists installed apps. Signatures may be given as raw
//! certificates in hex, as colon-hex fingerprints, or both:
//!
//! ```json
//! {
//!   "apps": [{
//!     "package_name": "com.bobpay",
//!     "version_code": 1,
//!     "label": "Bob Pay",
//!     "signing_certificates": ["3082010a02820101"],
//!     "default_method_name": "https://bobpay.com/webpay"
//!   }]
//! }
//! ```
//!
//! An offline map is a JSON object from manifest URL to a file path, relative
//! to the map's own directory.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;
use webpay_lib::catalog::{AppSourceRegistry, InstalledApp, StaticCatalog};
use webpay_lib::fetcher::StaticFetcher;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    apps: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(flatten)]
    app: InstalledApp,
    #[serde(default)]
    signing_certificates: Vec<String>,
}

impl CatalogEntry {
    fn into_app(self) -> Result<InstalledApp> {
        let mut app = self.app;
        for cert in &self.signing_certificates {
            let bytes = hex::decode(cert).with_context(|| {
                format!("Invalid certificate hex for {}", app.package_name)
            })?;
            app = app.with_signing_certificate(&bytes);
        }
        Ok(app)
    }
}

/// Parse catalog JSON into a catalog.
pub fn parse_catalog(contents: &str) -> Result<StaticCatalog> {
    let file: CatalogFile = serde_json::from_str(contents).context("Invalid catalog JSON")?;
    file.apps
        .into_iter()
        .map(CatalogEntry::into_app)
        .collect::<Result<StaticCatalog>>()
}

/// Load catalog files into a registry, one source per file in order.
pub fn load_registry(paths: &[impl AsRef<Path>]) -> Result<AppSourceRegistry> {
    let registry = AppSourceRegistry::new();
    for path in paths {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = parse_catalog(&contents)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?;
        tracing::debug!("Loaded {} apps from {}", catalog.len(), path.display());
        registry.register(path.display().to_string(), Arc::new(catalog));
    }
    Ok(registry)
}

/// Build a fetcher serving the files named by an offline map.
pub fn load_offline_fetcher(map_path: &Path) -> Result<StaticFetcher> {
    let contents = std::fs::read_to_string(map_path)
        .with_context(|| format!("Failed to read offline map {}", map_path.display()))?;
    let map: BTreeMap<String, String> =
        serde_json::from_str(&contents).context("Invalid offline map JSON")?;
    let base = map_path.parent().unwrap_or_else(|| Path::new("."));

    let fetcher = StaticFetcher::new();
    for (raw_url, file) in map {
        let url = Url::parse(&raw_url).with_context(|| format!("Invalid URL {raw_url:?}"))?;
        let path = base.join(&file);
        let body = std::fs::read(&path)
            .with_context(|| format!("Failed to read {} for {}", path.display(), url))?;
        fetcher.insert(url, body);
    }
    Ok(fetcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use webpay_lib::catalog::AppCatalog;
    use webpay_lib::fetcher::ManifestFetcher;
    use webpay_lib::verifier::Fingerprint;

    #[test]
    fn test_parse_catalog_with_certificates_and_fingerprints() {
        let fingerprint = Fingerprint::new([0xAB; 32]).to_colon_hex();
        let json = format!(
            r#"{{"apps": [
                {{"package_name": "com.bobpay", "version_code": 1, "label": "Bob Pay",
                  "signing_certificates": ["00ff"],
                  "signing_fingerprints": ["{fingerprint}"],
                  "default_method_name": "https://bobpay.com/webpay"}},
                {{"package_name": "com.cardapp", "version_code": 2, "label": "Card App",
                  "supported_method_names": ["basic-card"]}}
            ]}}"#
        );

        let catalog = parse_catalog(&json).unwrap();
        let bobpay = catalog.app("com.bobpay").unwrap();
        assert_eq!(bobpay.signing_fingerprints.len(), 2);
        assert!(bobpay
            .signing_fingerprints
            .contains(&Fingerprint::of_certificate(&[0x00, 0xff])));
        assert!(catalog.app("com.cardapp").unwrap().signing_fingerprints.is_empty());
    }

    #[test]
    fn test_parse_catalog_rejects_bad_hex() {
        let json = r#"{"apps": [{"package_name": "com.bobpay", "version_code": 1,
            "label": "Bob Pay", "signing_certificates": ["zz"]}]}"#;
        assert!(parse_catalog(json).is_err());
    }

    #[test]
    fn test_load_registry_one_source_per_file() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        std::fs::write(&a, r#"{"apps": []}"#).unwrap();
        std::fs::write(&b, r#"{"apps": []}"#).unwrap();

        let registry = load_registry(&[&a, &b]).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(load_registry(&[dir.path().join("missing.json")]).is_err());
    }

    #[tokio::test]
    async fn test_offline_map_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("webpay.json"), "{}").unwrap();
        let map = dir.path().join("map.json");
        std::fs::write(&map, r#"{"https://bobpay.com/webpay": "webpay.json"}"#).unwrap();

        let fetcher = load_offline_fetcher(&map).unwrap();
        let body = fetcher
            .fetch(&Url::parse("https://bobpay.com/webpay").unwrap())
            .await
            .unwrap();
        assert_eq!(body, b"{}");
    }
}
