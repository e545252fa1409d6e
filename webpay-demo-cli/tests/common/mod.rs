//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;
use webpay_lib::verifier::Fingerprint;

pub const BOBPAY_CERT_HEX: &str = "30820122300d06092a864886f70d01010105000300";

/// Run the CLI with the given arguments.
pub fn run_cli(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_webpay-demo"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute command");

    if !output.status.success() {
        eprintln!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
    }
    output
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn bobpay_fingerprint() -> Fingerprint {
    Fingerprint::of_certificate(&hex::decode(BOBPAY_CERT_HEX).unwrap())
}

/// An on-disk bobpay.com setup: one installed app, both manifests and an
/// offline map serving them.
pub struct BobPayFixture {
    pub dir: TempDir,
}

impl BobPayFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let fixture = Self { dir };

        fixture.write(
            "catalog.json",
            &serde_json::json!({
                "apps": [{
                    "package_name": "com.bobpay",
                    "version_code": 1,
                    "label": "Bob Pay",
                    "signing_certificates": [BOBPAY_CERT_HEX],
                    "default_method_name": "https://bobpay.com/webpay"
                }]
            })
            .to_string(),
        );
        fixture.write(
            "webpay.json",
            &serde_json::json!({
                "default_applications": ["https://bobpay.com/app.json"],
                "supported_origins": []
            })
            .to_string(),
        );
        fixture.write(
            "app.json",
            &serde_json::json!({
                "related_applications": [{
                    "platform": "play",
                    "id": "com.bobpay",
                    "min_version": "1",
                    "fingerprints": [{
                        "type": "sha256_cert",
                        "value": bobpay_fingerprint().to_colon_hex()
                    }]
                }]
            })
            .to_string(),
        );
        fixture.write(
            "offline.json",
            &serde_json::json!({
                "https://bobpay.com/webpay": "webpay.json",
                "https://bobpay.com/app.json": "app.json"
            })
            .to_string(),
        );
        fixture.write("config.json", "{}");
        fixture
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join(name), contents).expect("Failed to write fixture");
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
