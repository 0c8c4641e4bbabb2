//! Bundle stock CLI.
//!
//! # Usage
//!
//! ```bash
//! # Print the report for the configured bundle category
//! bundle-stock report
//!
//! # Scan another category and filter by name or SKU
//! bundle-stock report --category "Gift Sets" --query tee
//!
//! # Same payload as GET /api/bundles/stock
//! bundle-stock report --json
//! ```
//!
//! # Commands
//!
//! - `report` - Resolve every bundle and print buildable quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bundle-stock")]
#[command(author, version, about = "Bundle stock tools for BigCommerce")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bundle stock report
    Report {
        /// Category to scan instead of `BUNDLE_CATEGORY`
        #[arg(short, long)]
        category: Option<String>,

        /// Only show bundles whose name or SKU contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bundle_stock_admin=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Report {
            category,
            query,
            json,
        } => {
            let options = commands::report::ReportOptions {
                category,
                query,
                json,
            };
            commands::report::run(&options).await?;
        }
    }
    Ok(())
}
