//! JSON parsing for both manifest formats.
//!
//! A payment method manifest is all-or-nothing: one bad field rejects the
//! document. A web app manifest is lenient per entry: unusable entries and
//! fingerprints are dropped and the rest is kept.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};
use url::{Origin, Url};

use super::types::{
    PaymentMethodManifest, RelatedApplication, SupportedOrigins, WebAppManifest, PLAY_PLATFORM,
};
use crate::errors::ManifestKind;
use crate::methods::is_secure_url;
use crate::verifier::Fingerprint;
use crate::{Result, WebPayError};

const DEFAULT_APPLICATIONS: &str = "default_applications";
const SUPPORTED_ORIGINS: &str = "supported_origins";
const RELATED_APPLICATIONS: &str = "related_applications";
const SHA256_CERT: &str = "sha256_cert";

fn parse_object(bytes: &[u8], kind: ManifestKind) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| WebPayError::parse(kind, format!("malformed JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(WebPayError::parse(kind, "expected a JSON object")),
    }
}

/// Parse a payment method manifest.
pub fn parse_method_manifest(bytes: &[u8]) -> Result<PaymentMethodManifest> {
    let kind = ManifestKind::PaymentMethod;
    let map = parse_object(bytes, kind)?;

    let default_applications = match map.get(DEFAULT_APPLICATIONS) {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| {
                let raw = entry.as_str().ok_or_else(|| {
                    WebPayError::parse(kind, format!("{DEFAULT_APPLICATIONS} entries must be strings"))
                })?;
                Url::parse(raw).map_err(|e| {
                    WebPayError::parse(kind, format!("{raw:?} is not an absolute URL: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(WebPayError::parse(
                kind,
                format!("{DEFAULT_APPLICATIONS} must be an array"),
            ))
        }
    };

    let supported_origins = match map.get(SUPPORTED_ORIGINS) {
        None => SupportedOrigins::none(),
        Some(Value::String(s)) if s == "*" => SupportedOrigins::All,
        Some(Value::Array(entries)) => {
            let mut origins = HashSet::with_capacity(entries.len());
            for entry in entries {
                let raw = entry.as_str().ok_or_else(|| {
                    WebPayError::parse(kind, format!("{SUPPORTED_ORIGINS} entries must be strings"))
                })?;
                origins.insert(parse_origin(raw).ok_or_else(|| {
                    WebPayError::parse(kind, format!("{raw:?} is not a secure origin"))
                })?);
            }
            SupportedOrigins::Set(origins)
        }
        Some(_) => {
            return Err(WebPayError::parse(
                kind,
                format!("{SUPPORTED_ORIGINS} must be \"*\" or an array of origins"),
            ))
        }
    };

    Ok(PaymentMethodManifest {
        default_applications,
        supported_origins,
    })
}

/// Parse `https://host[:port]` with an optional trailing slash.
fn parse_origin(raw: &str) -> Option<Origin> {
    let url = Url::parse(raw).ok()?;
    let bare = url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
        && url.username().is_empty()
        && url.password().is_none();
    (bare && is_secure_url(&url)).then(|| url.origin())
}

/// Parse a web app manifest.
pub fn parse_web_app_manifest(bytes: &[u8]) -> Result<WebAppManifest> {
    let kind = ManifestKind::WebApp;
    let map = parse_object(bytes, kind)?;

    let entries = match map.get(RELATED_APPLICATIONS) {
        None => return Ok(WebAppManifest::default()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(WebPayError::parse(
                kind,
                format!("{RELATED_APPLICATIONS} must be an array"),
            ))
        }
    };

    let related_applications = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let parsed = parse_related_application(entry);
            if parsed.is_none() {
                tracing::debug!("skipping {RELATED_APPLICATIONS}[{index}]");
            }
            parsed
        })
        .collect();

    Ok(WebAppManifest {
        related_applications,
    })
}

fn parse_related_application(entry: &Value) -> Option<RelatedApplication> {
    let entry = entry.as_object()?;
    let platform = entry.get("platform")?.as_str()?;
    let id = entry.get("id").and_then(Value::as_str);

    if platform != PLAY_PLATFORM {
        return Some(RelatedApplication {
            platform: platform.to_string(),
            package_id: id.unwrap_or_default().to_string(),
            min_version: None,
            fingerprints: BTreeSet::new(),
        });
    }

    let package_id = id.filter(|id| !id.is_empty())?;
    let min_version = match entry.get("min_version") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.as_i64()?),
        Some(Value::String(s)) => Some(s.trim().parse::<i64>().ok()?),
        Some(_) => return None,
    };
    let fingerprints = entry
        .get("fingerprints")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(parse_fingerprint).collect())
        .unwrap_or_default();

    Some(RelatedApplication {
        platform: platform.to_string(),
        package_id: package_id.to_string(),
        min_version,
        fingerprints,
    })
}

fn parse_fingerprint(entry: &Value) -> Option<Fingerprint> {
    let entry = entry.as_object()?;
    if entry.get("type")?.as_str()? != SHA256_CERT {
        return None;
    }
    Fingerprint::from_colon_hex(entry.get("value")?.as_str()?)
}
