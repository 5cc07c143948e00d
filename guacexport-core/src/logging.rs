//! Log output of the export tool.
//!
//! Logs go to stderr so the export summary on stdout stays clean. The
//! filter follows the `-v`/`-q` flags unless `GUACEXPORT_LOG` holds
//! explicit `tracing` directives.

use crate::Result;
use crate::error::GuacExportError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives that replace the flags.
pub const LOG_ENV_VAR: &str = "GUACEXPORT_LOG";

/// Maps CLI verbosity flags to a tracing level.
///
/// `quiet` wins over any verbosity; 0 is INFO, 1 is DEBUG, 2+ is TRACE.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Default filter directives for the verbosity flags.
///
/// sqlx logs every statement, so it stays at WARN below `-vv`.
pub fn default_directives(verbose: u8, quiet: bool) -> String {
    let level = level_for(verbose, quiet);
    let driver = if quiet || verbose >= 2 { level } else { Level::WARN };

    format!(
        "{},sqlx={}",
        level.to_string().to_ascii_lowercase(),
        driver.to_string().to_ascii_lowercase()
    )
}

fn build_filter(verbose: u8, quiet: bool, overrides: Option<&str>) -> Result<EnvFilter> {
    let directives = match overrides.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => directives.to_string(),
        None => default_directives(verbose, quiet),
    };

    EnvFilter::try_new(&directives).map_err(|e| {
        GuacExportError::configuration(format!(
            "Invalid log filter '{}' (check {}): {}",
            directives, LOG_ENV_VAR, e
        ))
    })
}

/// Initializes logging for the verbosity flags.
///
/// # Example
/// ```rust,no_run
/// use guacexport_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
///
/// # Errors
/// Returns a configuration error for invalid `GUACEXPORT_LOG` directives
/// or when a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let overrides = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(verbose, quiet, overrides.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| {
            GuacExportError::configuration(format!("Failed to initialize logging: {}", e))
        })
}
