//! Loader configuration: where the warehouse is, where the raw data lives
//! and how many workers parallel phases may use.

use crate::env::EnvVars;
use error::SettingsError;
use model::execution::{
    connection::{ConnectionConfig, DEFAULT_WAREHOUSE_PORT, SslMode},
    sources::LoadSources,
};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::{debug, info};

pub mod error;
pub mod interpolate;

pub const DEFAULT_MAX_WORKERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match ext.as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseSettings {
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    #[serde(alias = "db", alias = "dbname")]
    pub database: String,
    pub user: String,
    #[serde(default, alias = "passwd")]
    pub password: String,
    #[serde(default, alias = "sslmode")]
    pub ssl_mode: SslMode,
}

/// The whole configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSettings {
    #[serde(alias = "redshift", alias = "dwh")]
    pub warehouse: WarehouseSettings,
    /// Role the warehouse assumes to read from object storage.
    #[serde(default)]
    pub iam_role: Option<String>,
    #[serde(default, alias = "sources")]
    pub s3: Option<LoadSources>,
    #[serde(default = "default_workers", alias = "max_workers")]
    pub workers: usize,
}

impl LoaderSettings {
    /// Reads, interpolates and validates a configuration file.
    pub fn load(path: impl AsRef<Path>, env: &EnvVars) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Self::parse(&content, format, env)?;
        info!(
            "Loaded configuration from {} (warehouse {}:{}/{})",
            path.display(),
            settings.warehouse.host,
            settings.warehouse.port,
            settings.warehouse.database
        );
        Ok(settings)
    }

    pub fn parse(content: &str, format: ConfigFormat, env: &EnvVars) -> Result<Self, SettingsError> {
        let doc = read_document(content, format, env)?;
        let settings: LoaderSettings = serde_json::from_value(doc)?;
        settings.validate()?;

        debug!("Configuration parsed: workers={}", settings.workers);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.workers == 0 {
            return Err(SettingsError::InvalidValue {
                field: "workers",
                reason: "must be at least 1".into(),
            });
        }

        if let Some(s3) = &self.s3 {
            let locations = [
                ("s3.log_data", &s3.log_data),
                ("s3.log_jsonpath", &s3.log_jsonpath),
                ("s3.song_data", &s3.song_data),
                ("s3.region", &s3.region),
            ];
            for (field, value) in locations {
                if value.trim().is_empty() {
                    return Err(SettingsError::InvalidValue {
                        field,
                        reason: "must not be empty".into(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Connection record handed to the connection factory.
    pub fn connection_config(&self) -> ConnectionConfig {
        let w = &self.warehouse;
        ConnectionConfig {
            host: w.host.clone(),
            port: w.port,
            database: w.database.clone(),
            user: w.user.clone(),
            password: w.password.clone(),
            role: self.iam_role.clone(),
            ssl_mode: w.ssl_mode,
        }
    }

    /// Storage locations and load role, when both are configured.
    pub fn bulk_load(&self) -> Option<(&LoadSources, &str)> {
        match (&self.s3, &self.iam_role) {
            (Some(sources), Some(role)) if !role.trim().is_empty() => Some((sources, role)),
            _ => None,
        }
    }
}

/// Parses a JSON or YAML document and resolves `${NAME}` references in it.
pub(crate) fn read_document(
    content: &str,
    format: ConfigFormat,
    env: &EnvVars,
) -> Result<serde_json::Value, SettingsError> {
    let mut doc: serde_json::Value = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    interpolate::interpolate(&mut doc, env)?;
    Ok(doc)
}

fn default_port() -> u16 {
    DEFAULT_WAREHOUSE_PORT
}

fn default_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

/// Ports show up both as numbers and as strings in hand-written configs.
fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {text}"))),
    }
}
