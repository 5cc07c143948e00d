//! Guacamole connection export tool.
//!
//! This binary connects to a Guacamole MySQL database and writes every
//! connection, with its parameters, attributes, group and permissions, to a
//! JSON document suitable for re-import.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - No credentials stored or logged
//! - Output validated before it is written

use anyhow::Context;
use clap::Parser;
use guacexport_collect::{
    Cli, Command,
    collect::{self, ExportOptions},
    resolve_database_url,
};
use guacexport_core::{initialize_export_validator, init_logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.global.verbose, cli.global.quiet)?;

    // Initialize JSON Schema validator
    initialize_export_validator().context("Failed to initialize export validator")?;

    let (database_url, source) = resolve_database_url(&cli.source)
        .await
        .context("Failed to resolve database connection")?;
    info!("Using credentials from {}", source);

    match cli.command.unwrap_or(Command::Export) {
        Command::Export => {
            let options = ExportOptions {
                compress: cli.compress,
                fail_on_empty: cli.fail_on_empty,
                quiet: cli.global.quiet,
            };
            collect::run_export(&database_url, &cli.output, options).await?;
        }
        Command::Test => collect::test_connection(&database_url, cli.global.quiet).await?,
    }

    Ok(())
}
