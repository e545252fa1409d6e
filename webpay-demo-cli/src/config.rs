//! Discovery configuration loading.
//!
//! Lookup order: `--config`, then `$WEBPAY_DEMO_CONFIG`, then
//! `<config_dir>/webpay-demo/config.json` if present, else defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use webpay_lib::discovery::DiscoveryConfig;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "WEBPAY_DEMO_CONFIG";

/// Pick the config file to read, if any.
fn resolve_path(
    explicit: Option<&Path>,
    env: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env {
        return Some(path);
    }
    config_dir
        .map(|dir| dir.join("webpay-demo").join("config.json"))
        .filter(|path| path.is_file())
}

/// Read and validate a config file.
pub fn read(path: &Path) -> Result<DiscoveryConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: DiscoveryConfig = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

/// Load the effective discovery config.
pub fn load(explicit: Option<&Path>) -> Result<DiscoveryConfig> {
    let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    match resolve_path(explicit, env, dirs::config_dir()) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            read(&path)
        }
        None => Ok(DiscoveryConfig::default()),
    }
}
