pub mod catalog;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod recommend;
pub mod seed;

use serde::Serialize;
use tarifa_core::config::{AppConfig, LoadOptions};

/// Exit status and printable output of one CLI invocation.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// Failure modes of the database-touching commands. Exit codes are stable
/// so shell callers can branch on them: 2 rejects the invocation itself,
/// 3 and 4 are environment problems, 5 and up happened inside the database
/// or the engine.
#[derive(Debug)]
pub enum CommandError {
    InvalidArgument(String),
    ConfigValidation(String),
    RuntimeInit(String),
    DbConnectivity(String),
    Migration(String),
    SeedExecution(String),
    SeedVerification(String),
    CatalogLoad(String),
    Recommendation(String),
    Serialization(String),
}

impl CommandError {
    pub fn class(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::ConfigValidation(_) => "config_validation",
            Self::RuntimeInit(_) => "runtime_init",
            Self::DbConnectivity(_) => "db_connectivity",
            Self::Migration(_) => "migration",
            Self::SeedExecution(_) => "seed_execution",
            Self::SeedVerification(_) => "seed_verification",
            Self::CatalogLoad(_) => "catalog_load",
            Self::Recommendation(_) => "recommendation",
            Self::Serialization(_) => "serialization",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) | Self::ConfigValidation(_) => 2,
            Self::RuntimeInit(_) => 3,
            Self::DbConnectivity(_) => 4,
            Self::Migration(_) | Self::SeedExecution(_) | Self::CatalogLoad(_) => 5,
            Self::SeedVerification(_) | Self::Recommendation(_) => 6,
            Self::Serialization(_) => 7,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(message)
            | Self::ConfigValidation(message)
            | Self::RuntimeInit(message)
            | Self::DbConnectivity(message)
            | Self::Migration(message)
            | Self::SeedExecution(message)
            | Self::SeedVerification(message)
            | Self::CatalogLoad(message)
            | Self::Recommendation(message)
            | Self::Serialization(message) => message,
        }
    }
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self { exit_code: 0, output: render_report(command, "ok", None, message.into()) }
    }

    pub fn failure(command: &str, error: CommandError) -> Self {
        Self {
            exit_code: error.exit_code(),
            output: render_report(
                command,
                "error",
                Some(error.class()),
                error.message().to_owned(),
            ),
        }
    }
}

pub(crate) fn load_config() -> Result<AppConfig, CommandError> {
    AppConfig::load(LoadOptions::default())
        .map_err(|error| CommandError::ConfigValidation(format!("configuration issue: {error}")))
}

pub(crate) fn blocking_runtime() -> Result<tokio::runtime::Runtime, CommandError> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandError::RuntimeInit(format!("failed to initialize async runtime: {error}"))
    })
}

#[derive(Debug, Serialize)]
struct CommandReport<'a> {
    command: &'a str,
    status: &'a str,
    error_class: Option<&'a str>,
    message: String,
}

fn render_report(
    command: &str,
    status: &str,
    error_class: Option<&str>,
    message: String,
) -> String {
    let report = CommandReport { command, status, error_class, message };
    serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
