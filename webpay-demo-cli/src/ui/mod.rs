//! Terminal output for the demo CLI.
//!
//! Status lines go to stdout, except errors which go to stderr so that
//! `--json` output stays parseable.

use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

/// Width of the key column in [`key_value`].
const KEY_WIDTH: usize = 22;

#[derive(Clone, Copy)]
enum Status {
    Success,
    Error,
    Info,
    Warning,
}

impl Status {
    fn marker(self) -> ColoredString {
        match self {
            Self::Success => "✓".green().bold(),
            Self::Error => "✗".red().bold(),
            Self::Info => "ℹ".blue().bold(),
            Self::Warning => "⚠".yellow().bold(),
        }
    }
}

fn status(kind: Status, message: &str) {
    let line = format!("{} {}", kind.marker(), message);
    match kind {
        Status::Error => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

pub fn success(message: &str) {
    status(Status::Success, message);
}

pub fn error(message: &str) {
    status(Status::Error, message);
}

pub fn info(message: &str) {
    status(Status::Info, message);
}

pub fn warning(message: &str) {
    status(Status::Warning, message);
}

/// Section title, preceded by a blank line.
pub fn header(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// An aligned `key: value` row.
pub fn key_value(key: &str, value: &str) {
    let key = format!("{key}:");
    println!("  {} {}", format!("{key:<width$}", width = KEY_WIDTH).cyan(), value);
}

/// A bullet nested under the previous row.
pub fn item(text: &str) {
    println!("    {} {}", "•".dimmed(), text);
}

pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Spinner shown on stderr while manifests download.
pub fn spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.green} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let spinner = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Pretty-print `value` as JSON on stdout.
pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
