use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "tarifa.toml";
const DEFAULT_DATABASE_URL: &str = "sqlite://tarifa.db?mode=rwc";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub leads: LeadsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

impl DatabaseConfig {
    /// One-connection pool settings for ad-hoc and in-memory databases,
    /// where SQLite gives every pooled connection its own database.
    pub fn single_connection(url: impl Into<String>) -> Self {
        Self { url: url.into(), max_connections: 1, timeout_secs: 5 }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LeadsConfig {
    /// Address notified when a new lead lands. Dispatch itself is handled by
    /// an external collaborator; we only log the notification event.
    pub notification_email: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<FileDatabase>,
    server: Option<FileServer>,
    leads: Option<FileLeads>,
    logging: Option<FileLogging>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDatabase {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FileServer {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct FileLeads {
    notification_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    /// Effective config with precedence: explicit overrides > environment >
    /// file > defaults.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let path = options
            .config_path
            .or_else(|| env::var("TARIFA_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let file = load_file(&path, options.require_file)?;

        let database = DatabaseConfig {
            url: options
                .overrides
                .database_url
                .or_else(|| env::var("TARIFA_DATABASE_URL").ok())
                .or(file.database.as_ref().and_then(|d| d.url.clone()))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
            max_connections: env_parse("TARIFA_DATABASE_MAX_CONNECTIONS")?
                .or(file.database.as_ref().and_then(|d| d.max_connections))
                .unwrap_or(5),
            timeout_secs: env_parse("TARIFA_DATABASE_TIMEOUT_SECS")?
                .or(file.database.as_ref().and_then(|d| d.timeout_secs))
                .unwrap_or(30),
        };

        let server = ServerConfig {
            bind_address: env::var("TARIFA_BIND_ADDRESS")
                .ok()
                .or(file.server.as_ref().and_then(|s| s.bind_address.clone()))
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned()),
            port: env_parse("TARIFA_PORT")?
                .or(file.server.as_ref().and_then(|s| s.port))
                .unwrap_or(DEFAULT_PORT),
        };

        let leads = LeadsConfig {
            notification_email: env::var("TARIFA_NOTIFICATION_EMAIL")
                .ok()
                .or(file.leads.as_ref().and_then(|l| l.notification_email.clone())),
        };

        let logging = LoggingConfig {
            level: options
                .overrides
                .log_level
                .or_else(|| env::var("TARIFA_LOG_LEVEL").ok())
                .or(file.logging.as_ref().and_then(|l| l.level.clone()))
                .unwrap_or_else(|| "info".to_owned()),
            format: env_log_format()?
                .or(file.logging.as_ref().and_then(|l| l.format))
                .unwrap_or(LogFormat::Compact),
        };

        let config = Self { database, server, leads, logging };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation("database.url must not be empty".to_owned()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_owned(),
            ));
        }
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation("server.bind_address must not be empty".to_owned()));
        }
        if let Some(email) = &self.leads.notification_email {
            if !email.contains('@') {
                return Err(ConfigError::Validation(format!(
                    "leads.notification_email is not a valid address: {email}"
                )));
            }
        }
        Ok(())
    }
}

fn load_file(path: &Path, required: bool) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(FileConfig::default());
    }

    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_owned(), value }),
        Err(_) => Ok(None),
    }
}

fn env_log_format() -> Result<Option<LogFormat>, ConfigError> {
    match env::var("TARIFA_LOG_FORMAT") {
        Ok(value) => match value.as_str() {
            "compact" => Ok(Some(LogFormat::Compact)),
            "pretty" => Ok(Some(LogFormat::Pretty)),
            "json" => Ok(Some(LogFormat::Json)),
            _ => Err(ConfigError::InvalidEnvOverride {
                key: "TARIFA_LOG_FORMAT".to_owned(),
                value,
            }),
        },
        Err(_) => Ok(None),
    }
}
