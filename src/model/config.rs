use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub extensions: ExtensionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub registry_path: String,
    pub log_filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionsConfig {
    pub default_attribute: String,
    pub scale: f64,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    ///
    /// `explicit` replaces the per-user config file and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => user_config_path().filter(|path| path.exists()),
        };

        let user = user_path
            .map(|path| {
                fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
            })
            .transpose()?;

        Self::from_layers(user.as_deref())
    }

    pub fn from_layers(user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;
        if let Some(user) = user {
            let overrides: toml::Table = toml::from_str(user).context("parsing user config")?;
            merge(&mut merged, overrides);
        }

        let mut config: AppConfig = toml::Value::Table(merged).try_into()?;

        let scale = config.extensions.scale;
        if !(scale.is_finite() && scale > 0.0) {
            bail!("extensions.scale must be a positive number, got {scale}");
        }

        // Expand ~ in registry_path
        if config.general.registry_path.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.general.registry_path =
                config
                    .general
                    .registry_path
                    .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn registry_path(&self) -> PathBuf {
        PathBuf::from(&self.general.registry_path)
    }
}

/// Overlays `overrides` onto `base`, descending into nested tables.
fn merge(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match value {
            toml::Value::Table(nested) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge(existing, nested);
                } else {
                    base.insert(key, toml::Value::Table(nested));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "extproxy")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
