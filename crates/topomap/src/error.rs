//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use topomap_config::ConfigError;
use topomap_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Inventory ────────────────────────────────────────────────────
    #[error("Inventory query to '{service}' failed: {reason}")]
    #[diagnostic(
        code(topomap::discovery_failed),
        help(
            "Check that the inventory service is reachable and answering.\n\
             Try: topomap discover --file <inventory.json> to rule out the network."
        )
    )]
    DiscoveryFailed { service: String, reason: String },

    #[error("Inventory returned records topomap cannot read: {message}")]
    #[diagnostic(
        code(topomap::malformed_inventory),
        help("Each record needs at least an \"id\"; check the inventory selector.")
    )]
    MalformedInventory { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(topomap::timeout),
        help("Increase timeout with --timeout or check inventory responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Store ────────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(topomap::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("{message}")]
    #[diagnostic(code(topomap::unsupported))]
    Unsupported { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(
        code(topomap::internal),
        help("This is a bug. Re-run with -vv and report the output.")
    )]
    Internal { message: String },

    // ── Geo ──────────────────────────────────────────────────────────
    #[error("City '{key}' not found")]
    #[diagnostic(
        code(topomap::city_not_found),
        help("Keys have the form \"City, Region, Country\", e.g. \"Paris, Île-de-France, France\".")
    )]
    CityNotFound { key: String },

    #[error("Cannot load city dataset {path}: {message}")]
    #[diagnostic(code(topomap::city_dataset))]
    CityDataset { path: String, message: String },

    #[error("No city dataset configured")]
    #[diagnostic(
        code(topomap::no_city_dataset),
        help("Pass --dataset <cities.csv> or set defaults.city_dataset in the config file.")
    )]
    NoCityDataset,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(topomap::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(topomap::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: topomap config set <name> --url <url>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No inventory configured")]
    #[diagnostic(
        code(topomap::no_config),
        help(
            "Create a profile with: topomap config set default --url <url>\n\
             or pass --inventory <url> or --file <inventory.json>.\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(topomap::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(topomap::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DiscoveryFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::CityNotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RemoteQueryFailed { service, reason } => {
                CliError::DiscoveryFailed { service, reason }
            }

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::MalformedBatchShape { message } => CliError::MalformedInventory { message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                resource_type: entity_type,
                identifier,
            },

            err @ CoreError::UnsupportedAction { .. } => CliError::Unsupported {
                message: err.to_string(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::CityDataset { path, message } => CliError::CityDataset { path, message },

            CoreError::InvariantViolation { message } | CoreError::Internal(message) => {
                CliError::Internal { message }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
