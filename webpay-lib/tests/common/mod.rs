//! Shared fixtures for integration tests.
//!
//! Models bobpay.com, which hosts the `https://bobpay.com/webpay` method
//! manifest and the `https://bobpay.com/app.json` web app manifest naming the
//! `com.bobpay` package, and alicepay.com, whose method lets other origins in.

#![allow(dead_code)]

use std::sync::Arc;

use url::Url;
use webpay_lib::catalog::{AppSourceRegistry, InstalledApp, StaticCatalog};
use webpay_lib::discovery::DiscoveryEngine;
use webpay_lib::fetcher::StaticFetcher;
use webpay_lib::verifier::Fingerprint;

pub const BOBPAY_METHOD: &str = "https://bobpay.com/webpay";
pub const BOBPAY_APP_MANIFEST: &str = "https://bobpay.com/app.json";
pub const ALICEPAY_METHOD: &str = "https://alicepay.com/webpay";

/// DER bytes of the production bobpay signing certificate.
pub const BOBPAY_CERT: &[u8] = &[
    0x30, 0x82, 0x01, 0x22, 0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01,
    0x01, 0x05, 0x00, 0x03,
];

/// DER bytes of the bobpay development signing certificate.
pub const BOBPAY_DEV_CERT: &[u8] = &[
    0x30, 0x82, 0x01, 0x22, 0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01,
    0x01, 0x05, 0x00, 0x04,
];

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn bobpay_fingerprint() -> Fingerprint {
    Fingerprint::of_certificate(BOBPAY_CERT)
}

pub fn bobpay_dev_fingerprint() -> Fingerprint {
    Fingerprint::of_certificate(BOBPAY_DEV_CERT)
}

/// A method manifest body.
pub fn method_manifest(default_applications: &[&str], supported_origins: serde_json::Value) -> String {
    serde_json::json!({
        "default_applications": default_applications,
        "supported_origins": supported_origins,
    })
    .to_string()
}

/// A web app manifest body listing `(package, fingerprint)` play entries.
pub fn web_app_manifest(entries: &[(&str, Fingerprint)]) -> String {
    let related: Vec<_> = entries
        .iter()
        .map(|(id, fingerprint)| {
            serde_json::json!({
                "platform": "play",
                "id": id,
                "min_version": "1",
                "fingerprints": [{"type": "sha256_cert", "value": fingerprint.to_colon_hex()}],
            })
        })
        .collect();
    serde_json::json!({ "related_applications": related }).to_string()
}

/// bobpay.com with a single production app entry.
pub fn bobpay_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_document(
            url(BOBPAY_METHOD),
            method_manifest(&[BOBPAY_APP_MANIFEST], serde_json::json!([])),
        )
        .with_document(
            url(BOBPAY_APP_MANIFEST),
            web_app_manifest(&[("com.bobpay", bobpay_fingerprint())]),
        )
}

/// bobpay's production app, signed with the production certificate.
pub fn bobpay_app() -> InstalledApp {
    InstalledApp::new("com.bobpay", 1, "Bob Pay")
        .with_signing_certificate(BOBPAY_CERT)
        .with_default_method(BOBPAY_METHOD)
}

/// An app that only declares `basic-card`.
pub fn card_app() -> InstalledApp {
    InstalledApp::new("com.cardapp", 1, "Card App")
        .with_signing_certificate(b"card app certificate")
        .with_supported_method("basic-card")
}

pub fn engine(apps: Vec<InstalledApp>, fetcher: Arc<StaticFetcher>) -> DiscoveryEngine {
    let catalog: StaticCatalog = apps.into_iter().collect();
    DiscoveryEngine::new(
        AppSourceRegistry::with_source("installed", Arc::new(catalog)),
        fetcher,
    )
}
