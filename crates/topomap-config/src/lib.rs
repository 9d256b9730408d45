//! Configuration for the topomap CLI.
//!
//! TOML profiles naming an inventory service, token resolution (env +
//! keyring + plaintext), and translation into `topomap_core::TopologyConfig`
//! and the `topomap_api` transport settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use topomap_api::{TlsMode, TransportConfig};
use topomap_core::{Canvas, TopologyConfig};

const KEYRING_SERVICE: &str = "topomap";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named inventory profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

/// Settings shared by every profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Inventory query timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_canvas_width")]
    pub canvas_width: f32,

    #[serde(default = "default_canvas_height")]
    pub canvas_height: f32,

    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    #[serde(default)]
    pub aggregate_links: bool,

    /// City CSV used when a device reports no coordinates.
    pub city_dataset: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            settle_delay_secs: default_settle_delay(),
            page_limit: default_page_limit(),
            aggregate_links: false,
            city_dataset: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_canvas_width() -> f32 {
    2000.0
}
fn default_canvas_height() -> f32 {
    857.0
}
fn default_settle_delay() -> u64 {
    5
}
fn default_page_limit() -> u32 {
    500
}

/// A named inventory profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Inventory service base URL (e.g. "http://inventory.local:9092/topology").
    pub inventory: String,

    /// Service answering discovery queries.
    #[serde(default = "default_service")]
    pub service: String,

    #[serde(default)]
    pub area: u8,

    /// Bearer token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    pub aggregate_links: Option<bool>,

    pub city_dataset: Option<PathBuf>,
}

fn default_service() -> String {
    "inventory".into()
}

impl Profile {
    pub fn new(inventory: impl Into<String>) -> Self {
        Self {
            inventory: inventory.into(),
            service: default_service(),
            area: 0,
            token: None,
            token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            aggregate_links: None,
            city_dataset: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "topomap", "topomap").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("topomap");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` and the environment.
///
/// Defaults are overridden by the file, the file by `TOPOMAP_`-prefixed
/// variables; nested keys use `__` (`TOPOMAP_DEFAULTS__TIMEOUT=5`).
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TOPOMAP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the inventory bearer token, if any.
///
/// Checked in order: the profile's `token_env` variable, the system
/// keyring (`topomap` / `<profile>/token`), then plaintext `token`.
/// Inventories without authentication need none.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

// ── Translation ─────────────────────────────────────────────────────

/// Inventory URL and HTTP transport settings for a profile.
pub fn profile_to_transport(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<(Url, TransportConfig), ConfigError> {
    let url: Url = profile
        .inventory
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "inventory".into(),
            reason: format!("invalid URL: {}", profile.inventory),
        })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        token: resolve_token(profile, profile_name),
    };
    Ok((url, transport))
}

/// Build the core topology config for a profile.
pub fn profile_to_topology_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<TopologyConfig, ConfigError> {
    for (field, value) in [
        ("canvas_width", defaults.canvas_width),
        ("canvas_height", defaults.canvas_height),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: format!("must be a positive number, got {value}"),
            });
        }
    }
    if defaults.page_limit == 0 {
        return Err(ConfigError::Validation {
            field: "page_limit".into(),
            reason: "must be at least 1".into(),
        });
    }

    Ok(TopologyConfig {
        service_name: profile.service.clone(),
        service_area: profile.area,
        canvas: Canvas {
            width: defaults.canvas_width,
            height: defaults.canvas_height,
        },
        settle_delay: Duration::from_secs(defaults.settle_delay_secs),
        page_limit: defaults.page_limit,
        page: 0,
        query_timeout_secs: profile.timeout.unwrap_or(defaults.timeout),
        aggregate_links: profile.aggregate_links.unwrap_or(defaults.aggregate_links),
        city_dataset: profile
            .city_dataset
            .clone()
            .or_else(|| defaults.city_dataset.clone()),
    })
}

/// Topology config for file-based runs that have no profile.
pub fn defaults_to_topology_config(defaults: &Defaults) -> Result<TopologyConfig, ConfigError> {
    profile_to_topology_config(&Profile::new(""), defaults)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 10
aggregate_links = true

[profiles.lab]
inventory = "http://inventory.lab:9092/topology"
area = 2
token = "plain"
"#;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("TOPOMAP_DEFAULTS__PAGE_LIMIT", "50");
            jail.set_env("TOPOMAP_DEFAULTS__TIMEOUT", "7");

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
            assert_eq!(cfg.defaults.timeout, 7);
            assert_eq!(cfg.defaults.page_limit, 50);
            assert!(cfg.defaults.aggregate_links);
            assert_eq!(cfg.defaults.output, "table");

            let (name, profile) = cfg.profile(None).map_err(|e| e.to_string())?;
            assert_eq!(name, "lab");
            assert_eq!(profile.service, "inventory");
            assert_eq!(profile.area, 2);
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile(Some("prod")),
            Err(ConfigError::UnknownProfile { name }) if name == "prod"
        ));
    }

    #[test]
    fn profile_values_win_over_defaults() {
        let mut profile = Profile::new("http://inv:9092");
        profile.timeout = Some(3);
        profile.aggregate_links = Some(false);
        let defaults = Defaults {
            aggregate_links: true,
            city_dataset: Some("cities.csv".into()),
            ..Defaults::default()
        };

        let cfg = profile_to_topology_config(&profile, &defaults).unwrap();
        assert_eq!(cfg.query_timeout_secs, 3);
        assert!(!cfg.aggregate_links);
        assert_eq!(cfg.city_dataset, Some(PathBuf::from("cities.csv")));
        assert_eq!(cfg.canvas, Canvas::default());
        assert_eq!(cfg.settle_delay, Duration::from_secs(5));
    }

    #[test]
    fn non_positive_canvas_is_rejected() {
        let defaults = Defaults {
            canvas_width: 0.0,
            ..Defaults::default()
        };
        assert!(matches!(
            defaults_to_topology_config(&defaults),
            Err(ConfigError::Validation { field, .. }) if field == "canvas_width"
        ));
    }

    #[test]
    fn invalid_inventory_url_is_rejected() {
        let profile = Profile::new("not a url");
        assert!(matches!(
            profile_to_transport(&profile, "p", &Defaults::default()),
            Err(ConfigError::Validation { field, .. }) if field == "inventory"
        ));
    }

    #[test]
    fn token_env_takes_precedence_over_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("LAB_TOKEN", "from-env");
            let mut profile = Profile::new("http://inv:9092");
            profile.token_env = Some("LAB_TOKEN".into());
            profile.token = Some("plain".into());

            let token = resolve_token(&profile, "lab-test").unwrap();
            assert_eq!(secrecy::ExposeSecret::expose_secret(&token), "from-env");
            Ok(())
        });
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://inv:9092/topology"));

        save_config_to(&cfg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(loaded, cfg);
    }
}
