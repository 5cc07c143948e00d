//! Library module for guacexport-collect
//!
//! This module holds the command line definition and the export workflow so
//! they can be exercised by tests. The binary entry point is in main.rs.

pub mod collect;
pub mod output;

use clap::{Args, Parser, Subcommand};
use guacexport_core::{
    ConnectionConfig, DeploymentDescriptor, Result,
    config::{DEFAULT_HOST, DEFAULT_MYSQL_PORT, parse_mysql_url},
    descriptor::{DEFAULT_DB_SERVICE, DEFAULT_DESCRIPTOR_PATH},
};
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Default path of the written export.
pub const DEFAULT_OUTPUT_PATH: &str = "export.json";

#[derive(Debug, Parser)]
#[command(name = "guacexport-collect")]
#[command(about = "Apache Guacamole connection export tool")]
#[command(version)]
#[command(long_about = "
guacexport - Apache Guacamole connection export

Reads every connection of a Guacamole MySQL database together with its
parameters, attributes, connection group and granted users and user groups,
and writes them as a single JSON document for re-import.

Database credentials are read from the database service of the deployment's
docker-compose file unless --database-url (or DATABASE_URL) is given.

SECURITY FEATURES:
- Read-only database sessions
- Passwords never logged; connection strings are redacted
- Output validated against a JSON Schema before it is written

EXAMPLES:
  guacexport-collect
  guacexport-collect --port 3307 --output /backup/guacamole.json
  guacexport-collect --database-url mysql://guacamole_user:pw@db/guacamole_db
  guacexport-collect test
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file path
    #[arg(
        short,
        long,
        global = true,
        default_value = DEFAULT_OUTPUT_PATH,
        help = "Output file path"
    )]
    pub output: PathBuf,

    /// Enable compression
    #[arg(long, global = true, help = "Compress output using Zstandard")]
    pub compress: bool,

    /// Fail instead of writing an export without connections
    #[arg(
        long,
        global = true,
        help = "Exit with an error if the database contains no connections"
    )]
    pub fail_on_empty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Export connections to a JSON file (default)
    Export,
    /// Test database connection
    Test,
}

/// Where the database connection comes from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Deployment descriptor holding the database credentials
    #[arg(
        long,
        global = true,
        env = "GUACEXPORT_COMPOSE_FILE",
        default_value = DEFAULT_DESCRIPTOR_PATH,
        value_name = "FILE",
        help = "docker-compose file declaring the database service"
    )]
    pub compose_file: PathBuf,

    /// Database service name in the descriptor
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_DB_SERVICE,
        help = "Service whose environment holds the Guacamole credentials"
    )]
    pub service: String,

    /// Database host
    #[arg(long, global = true, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Database port
    #[arg(
        long,
        global = true,
        env = "GUACAMOLE_DB_PORT",
        default_value_t = DEFAULT_MYSQL_PORT
    )]
    pub port: u16,

    /// Database connection URL
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        hide_env_values = true,
        help = "MySQL connection string; bypasses the compose file (credentials will be sanitized in logs)"
    )]
    pub database_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all output except errors"
    )]
    pub quiet: bool,
}

/// Origin of the resolved connection URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// `--database-url` or `DATABASE_URL`
    DatabaseUrl,
    /// Environment of a service in the deployment descriptor
    Descriptor { path: PathBuf, service: String },
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseUrl => write!(f, "database URL"),
            Self::Descriptor { path, service } => {
                write!(f, "service '{}' of {}", service, path.display())
            }
        }
    }
}

/// Resolves the connection URL from the command line or the descriptor.
///
/// An explicit, non-blank URL wins. Otherwise the credentials are read from the
/// descriptor service and combined with `--host` and `--port`.
///
/// # Security
/// The returned URL contains the password and is zeroized on drop. Log it
/// only through `redact_database_url`.
///
/// # Errors
/// Returns a configuration error for a malformed URL or a missing service,
/// an I/O error if the descriptor cannot be read and a descriptor error if
/// it cannot be parsed.
pub async fn resolve_database_url(
    args: &SourceArgs,
) -> Result<(Zeroizing<String>, CredentialSource)> {
    if let Some(url) = args
        .database_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
    {
        parse_mysql_url(url)?;
        return Ok((
            Zeroizing::new(url.to_string()),
            CredentialSource::DatabaseUrl,
        ));
    }

    let descriptor = DeploymentDescriptor::load(&args.compose_file).await?;
    let credentials = descriptor.database_credentials(&args.service)?;

    let config = credentials.apply_to(ConnectionConfig::new(args.host.clone()).with_port(args.port));
    config.validate()?;
    tracing::debug!("Resolved credentials for {}", config);

    let url = credentials.connection_url(&config)?;
    Ok((
        url,
        CredentialSource::Descriptor {
            path: args.compose_file.clone(),
            service: args.service.clone(),
        },
    ))
}
