//! Deployment descriptor (docker-compose) credential lookup.
//!
//! The Guacamole deployment keeps its database credentials in the
//! environment block of the database service:
//!
//! ```yaml
//! services:
//!   db:
//!     image: mysql:8
//!     environment:
//!       GUACAMOLE_DATABASE: guacamole_db
//!       GUACAMOLE_USERNAME: guacamole_user
//!       GUACAMOLE_PASSWORD: some-password
//! ```
//!
//! Compose also allows the list form (`- GUACAMOLE_DATABASE=guacamole_db`);
//! both are accepted. Missing variables fall back to the stock Guacamole
//! values.

use crate::Result;
use crate::config::DatabaseCredentials;
use crate::error::GuacExportError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Descriptor location of the stock deployment.
pub const DEFAULT_DESCRIPTOR_PATH: &str = "/etc/kcm-setup/docker-compose.yml";

/// Name of the database service in the descriptor.
pub const DEFAULT_DB_SERVICE: &str = "db";

/// Environment variable holding the database name.
pub const DATABASE_VAR: &str = "GUACAMOLE_DATABASE";
/// Environment variable holding the database user.
pub const USERNAME_VAR: &str = "GUACAMOLE_USERNAME";
/// Environment variable holding the database password.
pub const PASSWORD_VAR: &str = "GUACAMOLE_PASSWORD";

/// Database name used when the descriptor does not set one.
pub const DEFAULT_DATABASE: &str = "guacamole_db";
/// Database user used when the descriptor does not set one.
pub const DEFAULT_USERNAME: &str = "guacamole_user";
/// Password used when the descriptor does not set one.
pub const DEFAULT_PASSWORD: &str = "password";

/// Environment block of a compose service, in either supported form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceEnvironment {
    Map(IndexMap<String, Option<serde_yaml::Value>>),
    List(Vec<String>),
}

impl ServiceEnvironment {
    fn into_variables(self) -> IndexMap<String, String> {
        match self {
            Self::Map(map) => map
                .into_iter()
                .filter_map(|(key, value)| scalar_to_string(value?).map(|v| (key, v)))
                .collect(),
            // `KEY` without `=` passes the host value through; there is none here
            Self::List(entries) => entries
                .into_iter()
                .filter_map(|entry| {
                    entry
                        .split_once('=')
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                })
                .collect(),
        }
    }
}

fn scalar_to_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct ServiceDefinition {
    #[serde(default)]
    environment: Option<ServiceEnvironment>,
}

#[derive(Debug, Deserialize)]
struct ComposeFile {
    #[serde(default)]
    services: IndexMap<String, serde_yaml::Value>,
}

/// A parsed deployment descriptor.
///
/// Only the service definitions are retained, and each is decoded lazily so
/// unrelated services with unusual shapes do not prevent reading the
/// database service.
#[derive(Debug)]
pub struct DeploymentDescriptor {
    services: IndexMap<String, serde_yaml::Value>,
}

impl DeploymentDescriptor {
    /// Parses descriptor YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let compose: ComposeFile =
            serde_yaml::from_str(content).map_err(|e| GuacExportError::Descriptor {
                context: "Failed to parse deployment descriptor".to_string(),
                source: e,
            })?;

        Ok(Self {
            services: compose.services,
        })
    }

    /// Reads and parses the descriptor at `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GuacExportError::io(
                format!("Failed to read deployment descriptor {}", path.display()),
                e,
            )
        })?;

        tracing::debug!("Loaded deployment descriptor from {}", path.display());
        Self::from_yaml(&content)
    }

    /// Names of the services defined in the descriptor.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Environment variables of a service.
    ///
    /// # Errors
    /// Returns a configuration error if the service does not exist and a
    /// descriptor error if its definition cannot be decoded.
    pub fn service_environment(&self, service: &str) -> Result<IndexMap<String, String>> {
        let definition = self.services.get(service).ok_or_else(|| {
            GuacExportError::configuration(format!(
                "Service '{}' not found in deployment descriptor",
                service
            ))
        })?;

        let definition: ServiceDefinition = if definition.is_null() {
            ServiceDefinition::default()
        } else {
            serde_yaml::from_value(definition.clone()).map_err(|e| {
                GuacExportError::Descriptor {
                    context: format!("Invalid definition of service '{}'", service),
                    source: e,
                }
            })?
        };

        Ok(definition
            .environment
            .map(ServiceEnvironment::into_variables)
            .unwrap_or_default())
    }

    /// Database credentials declared on a service, with stock fallbacks.
    pub fn database_credentials(&self, service: &str) -> Result<DatabaseCredentials> {
        let mut environment = self.service_environment(service)?;

        let mut take = |name: &str, default: &str| {
            environment.shift_remove(name).unwrap_or_else(|| {
                tracing::debug!("{} not set on service '{}', using default", name, service);
                default.to_string()
            })
        };

        let database = take(DATABASE_VAR, DEFAULT_DATABASE);
        let username = take(USERNAME_VAR, DEFAULT_USERNAME);
        let password = take(PASSWORD_VAR, DEFAULT_PASSWORD);

        Ok(DatabaseCredentials::new(database, username, password))
    }
}
