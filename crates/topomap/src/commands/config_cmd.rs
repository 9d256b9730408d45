//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use topomap_config::{Config, ConfigError, Profile, save_config_to};

use crate::cli::{ConfigArgs, ConfigCommand, ConfigSetArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{config_path, load_config};

const MASK: &str = "****";

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
    cfg
}

#[derive(Serialize)]
struct ProfileSummary {
    name: String,
    inventory: String,
    service: String,
    area: u8,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Inventory")]
    inventory: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Area")]
    area: u8,
}

fn profile_summaries(cfg: &Config) -> Vec<ProfileSummary> {
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            inventory: p.inventory.clone(),
            service: p.service.clone(),
            area: p.area,
            default: cfg.default_profile.as_deref() == Some(name.as_str()),
        })
        .collect()
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config_path(global);
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&load_config(global)?);
            let out = match global.output {
                OutputFormat::Json | OutputFormat::JsonCompact => {
                    output::render_single(&global.output, &cfg, |_| String::new(), |_| String::new())?
                }
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(ConfigError::from)?
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = load_config(global)?;
            let out = output::render_list(
                &global.output,
                &profile_summaries(&cfg),
                |p| ProfileRow {
                    marker: if p.default { "*" } else { "" },
                    name: p.name.clone(),
                    inventory: p.inventory.clone(),
                    service: p.service.clone(),
                    area: p.area,
                },
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set(set) => {
            let mut cfg = load_config(global)?;
            let name = set_profile(&mut cfg, set)?;
            save_config_to(&cfg, &path)?;
            output::print_output(
                &format!("Profile '{name}' saved to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = load_config(global)?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            save_config_to(&cfg, &path)?;
            output::print_output(&format!("Default profile is now '{name}'"), global.quiet);
            Ok(())
        }
    }
}

/// Insert the profile described by `set`, making it the default when the
/// current default does not exist. Returns the profile name.
fn set_profile(cfg: &mut Config, set: ConfigSetArgs) -> Result<String, CliError> {
    if url_is_invalid(&set.url) {
        return Err(CliError::Validation {
            field: "inventory".into(),
            reason: format!("invalid URL: {}", set.url),
        });
    }

    let mut profile = cfg
        .profiles
        .remove(&set.name)
        .unwrap_or_else(|| Profile::new(set.url.clone()));
    profile.inventory = set.url;
    profile.service = set.service;
    profile.area = set.area;
    if set.token_env.is_some() {
        profile.token_env = set.token_env;
    }
    cfg.profiles.insert(set.name.clone(), profile);

    let default_missing = cfg
        .default_profile
        .as_ref()
        .is_none_or(|d| !cfg.profiles.contains_key(d));
    if default_missing {
        cfg.default_profile = Some(set.name.clone());
    }
    Ok(set.name)
}

fn url_is_invalid(url: &str) -> bool {
    !url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn set_args(name: &str, url: &str) -> ConfigSetArgs {
        ConfigSetArgs {
            name: name.into(),
            url: url.into(),
            service: "inventory".into(),
            area: 1,
            token_env: None,
        }
    }

    #[test]
    fn first_profile_becomes_default() {
        let mut cfg = Config::default();
        set_profile(&mut cfg, set_args("lab", "http://inv:9092")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.profiles["lab"].area, 1);

        set_profile(&mut cfg, set_args("prod", "https://inv.prod")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
    }

    #[test]
    fn updating_a_profile_keeps_its_token() {
        let mut cfg = Config::default();
        let mut existing = Profile::new("http://old");
        existing.token = Some("secret".into());
        cfg.profiles.insert("lab".into(), existing);

        set_profile(&mut cfg, set_args("lab", "http://new")).unwrap();
        assert_eq!(cfg.profiles["lab"].inventory, "http://new");
        assert_eq!(cfg.profiles["lab"].token.as_deref(), Some("secret"));
        assert_eq!(redacted(&cfg).profiles["lab"].token.as_deref(), Some(MASK));
    }

    #[test]
    fn non_http_urls_are_rejected() {
        let mut cfg = Config::default();
        assert!(set_profile(&mut cfg, set_args("x", "inv:9092")).is_err());
        assert!(set_profile(&mut cfg, set_args("x", "ftp://inv")).is_err());
        assert!(cfg.profiles.is_empty());
    }
}
