//! Classify command - check payment method identifiers

use anyhow::Result;
use webpay_lib::methods::{classify, MethodIdentifier};

use crate::ui;

pub fn run(methods: &[String], verbose: bool) -> Result<()> {
    ui::header("Classify Payment Methods");

    let mut rejected = 0;
    for raw in methods {
        match classify(raw) {
            Ok(MethodIdentifier::Standard(method)) => {
                ui::success(&format!("{raw}: standard method ({method})"));
            }
            Ok(MethodIdentifier::Url(url)) => {
                ui::success(&format!("{raw}: URL method"));
                if verbose {
                    ui::key_value("Manifest", url.as_str());
                    ui::key_value("Origin", &url.origin().ascii_serialization());
                }
            }
            Err(e) => {
                rejected += 1;
                ui::warning(&e.to_string());
            }
        }
    }

    ui::separator();
    ui::info(&format!(
        "{} accepted, {} rejected",
        methods.len() - rejected,
        rejected
    ));
    Ok(())
}
