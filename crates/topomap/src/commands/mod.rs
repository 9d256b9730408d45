//! Command handlers and the wiring shared by the discovery commands.

pub mod config_cmd;
pub mod discover;
pub mod geo;
pub mod view;

use std::path::{Path, PathBuf};

use tracing::debug;

use topomap_api::{InventoryClient, InventoryQuery, QueryResponse};
use topomap_config::{Config, ConfigError, Profile};
use topomap_core::{
    CoreError, InventorySource, NetworkDeviceAdapter, StaticInventory, TopologyService,
};

use crate::cli::{GlobalOpts, SourceArgs};
use crate::error::CliError;

pub type Service = TopologyService<NetworkDeviceAdapter, Inventory>;

/// Where discovery reads records from.
pub enum Inventory {
    File(StaticInventory),
    Remote(InventoryClient),
}

impl InventorySource for Inventory {
    async fn query(&self, query: &InventoryQuery) -> Result<QueryResponse, CoreError> {
        match self {
            Self::File(source) => source.query(query).await,
            Self::Remote(client) => InventorySource::query(client, query).await,
        }
    }
}

// ── Config ───────────────────────────────────────────────────────────

pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(topomap_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(topomap_config::load_config_from(&config_path(global))?)
}

/// The profile to discover from: `--inventory` builds an ad-hoc one,
/// otherwise the named (or default) profile from the config file.
fn resolve_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let (name, mut profile) = if let Some(ref url) = global.inventory {
        ("cli".to_owned(), Profile::new(url.clone()))
    } else {
        match cfg.profile(global.profile.as_deref()) {
            Ok((name, profile)) => (name.to_owned(), profile.clone()),
            Err(ConfigError::UnknownProfile { name }) => {
                return Err(if cfg.profiles.is_empty() && global.profile.is_none() {
                    CliError::NoConfig {
                        path: config_path(global).display().to_string(),
                    }
                } else {
                    CliError::ProfileNotFound {
                        name,
                        available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                    }
                });
            }
            Err(e) => return Err(e.into()),
        }
    };

    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    Ok((name, profile))
}

// ── Service ──────────────────────────────────────────────────────────

/// Build the topology service for a discovery command.
pub fn build_service(global: &GlobalOpts, source: &SourceArgs) -> Result<Service, CliError> {
    let cfg = load_config(global)?;

    let (mut config, inventory) = if let Some(ref path) = source.file {
        let mut config = topomap_config::defaults_to_topology_config(&cfg.defaults)?;
        if let Some(timeout) = global.timeout {
            config.query_timeout_secs = timeout;
        }
        (config, Inventory::File(read_inventory_file(path)?))
    } else {
        let (name, profile) = resolve_profile(global, &cfg)?;
        let config = topomap_config::profile_to_topology_config(&profile, &cfg.defaults)?;
        let (url, transport) = topomap_config::profile_to_transport(&profile, &name, &cfg.defaults)?;
        debug!(profile = %name, %url, "using inventory service");
        let client = InventoryClient::new(url, &transport).map_err(CoreError::from)?;
        (config, Inventory::Remote(client))
    };

    if source.aggregate {
        config.aggregate_links = true;
    }
    let adapter = config.network_device_adapter();
    Ok(TopologyService::new(config, adapter, inventory))
}

fn read_inventory_file(path: &Path) -> Result<StaticInventory, CliError> {
    let contents = std::fs::read_to_string(path)?;
    StaticInventory::from_json(&contents).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("{}: {e}", path.display()),
    })
}
