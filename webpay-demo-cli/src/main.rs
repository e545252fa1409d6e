//! WebPay Demo CLI
//!
//! Command-line interface for exercising payment app discovery against local
//! catalogs and live or offline manifests.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod catalog_file;
mod commands;
mod config;
mod ui;

#[derive(Parser)]
#[command(name = "webpay-demo")]
#[command(about = "WebPay Demo CLI - Discover and verify native payment apps", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Discovery config file (can also be set via WEBPAY_DEMO_CONFIG env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify payment method identifiers
    Classify {
        /// Method identifiers to classify
        #[arg(required = true)]
        methods: Vec<String>,
    },

    /// Compute the SHA-256 fingerprint of a signing certificate
    Fingerprint {
        /// Certificate bytes as hex
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        cert_hex: Option<String>,

        /// Read the DER certificate from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Parse a manifest file and show what it declares
    ParseManifest {
        /// Manifest file
        file: PathBuf,

        /// Manifest format
        #[arg(long, value_enum, default_value = "method")]
        kind: ManifestKindArg,
    },

    /// Discover payment apps for a set of methods
    Discover {
        /// Catalog file of installed apps (repeatable; earlier files win)
        #[arg(long, required = true)]
        catalog: Vec<PathBuf>,

        /// Requested payment method (repeatable)
        #[arg(short, long = "method", required = true)]
        methods: Vec<String>,

        /// Serve manifests from a URL-to-file map instead of the network
        #[arg(long)]
        offline: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Manifest format selector for `parse-manifest`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ManifestKindArg {
    /// Payment method manifest
    Method,
    /// Web app manifest
    WebApp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG takes precedence
    let default_filter = if cli.verbose {
        "webpay_demo_cli=debug,webpay_lib=debug"
    } else {
        "webpay_demo_cli=info,webpay_lib=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch commands
    match cli.command {
        Commands::Classify { methods } => {
            commands::classify::run(&methods, cli.verbose)?;
        }
        Commands::Fingerprint { cert_hex, file } => {
            commands::fingerprint::run(cert_hex.as_deref(), file.as_deref())?;
        }
        Commands::ParseManifest { file, kind } => {
            commands::parse_manifest::run(&file, kind, cli.verbose)?;
        }
        Commands::Discover {
            catalog,
            methods,
            offline,
            json,
        } => {
            let config = config::load(cli.config.as_deref())?;
            commands::discover::run(
                &catalog,
                &methods,
                offline.as_deref(),
                config,
                json,
                cli.verbose,
            )
            .await?;
        }
    }

    Ok(())
}
