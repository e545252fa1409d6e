//! Smoke tests for webpay-demo-cli
//!
//! These tests exercise the commands that need no catalog or network.

mod common;

use common::{run_cli, stdout, bobpay_fingerprint, BOBPAY_CERT_HEX};

#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());

    let help = stdout(&output);
    for command in ["classify", "fingerprint", "parse-manifest", "discover"] {
        assert!(help.contains(command), "Help should mention '{command}'");
    }
}

#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("webpay-demo"));
}

#[test]
fn test_classify_reports_each_identifier() {
    let output = run_cli(&[
        "classify",
        "basic-card",
        "https://bobpay.com/webpay",
        "http://bobpay.com/webpay",
    ]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("basic-card: standard method"));
    assert!(text.contains("https://bobpay.com/webpay: URL method"));
    assert!(text.contains("2 accepted, 1 rejected"));
}

#[test]
fn test_fingerprint_from_hex() {
    let output = run_cli(&["fingerprint", BOBPAY_CERT_HEX]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), bobpay_fingerprint().to_colon_hex());
}

#[test]
fn test_fingerprint_rejects_bad_hex() {
    let output = run_cli(&["fingerprint", "not-hex"]);
    assert!(!output.status.success());
}

#[test]
fn test_fingerprint_requires_input() {
    let output = run_cli(&["fingerprint"]);
    assert!(!output.status.success());
}
