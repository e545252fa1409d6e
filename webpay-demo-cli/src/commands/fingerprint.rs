//! Fingerprint command - hash a signing certificate

use std::path::Path;

use anyhow::{bail, Context, Result};
use webpay_lib::verifier::Fingerprint;

/// Print the manifest-style fingerprint of a certificate.
pub fn run(cert_hex: Option<&str>, file: Option<&Path>) -> Result<()> {
    let certificate = match (cert_hex, file) {
        (Some(hex), None) => decode_hex(hex)?,
        (None, Some(path)) => std::fs::read(path)
            .with_context(|| format!("Failed to read certificate {}", path.display()))?,
        _ => bail!("Provide either a certificate hex string or --file"),
    };
    tracing::debug!("Hashing {} certificate bytes", certificate.len());

    println!("{}", Fingerprint::of_certificate(&certificate));
    Ok(())
}

/// Decode hex, tolerating colons and whitespace between bytes.
fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).context("Certificate is not valid hex")
}
