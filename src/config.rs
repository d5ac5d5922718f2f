use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ledger::DEFAULT_UPCOMING_DAYS;

pub(crate) const DB_ENV_VAR: &str = "BUDGETBUDDY_DB";
const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "budgetbuddy.db";

/// User preferences. Missing or unknown fields fall back to defaults so an
/// older config file keeps loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) currency_symbol: String,
    pub(crate) upcoming_window_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "$".into(),
            upcoming_window_days: DEFAULT_UPCOMING_DAYS,
            database_path: None,
        }
    }
}

impl Config {
    pub(crate) const KEYS: [&'static str; 3] = ["currency", "window", "database"];

    /// Update one setting from its command-line spelling.
    pub(crate) fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "currency" => self.currency_symbol = value.to_string(),
            "window" => {
                self.upcoming_window_days = value
                    .trim()
                    .parse()
                    .with_context(|| format!("'{value}' is not a number of days"))?;
            }
            "database" => {
                self.database_path = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => anyhow::bail!(
                "Unknown config key '{other}' (expected one of: {})",
                Self::KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "budgetbuddy", "BudgetBuddy")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

pub(crate) struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub(crate) fn new() -> Result<Self> {
        let dirs = project_dirs()?;
        Ok(Self::with_path(dirs.config_dir().join(CONFIG_FILE)))
    }

    pub(crate) fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid config file: {}", self.path.display()))
    }

    /// Write through a temp file so a crash never leaves half a config.
    pub(crate) fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Where the database lives: `BUDGETBUDDY_DB`, then the config setting, then
/// the platform data directory.
pub(crate) fn resolve_db_path(config: &Config, env_override: Option<PathBuf>) -> Result<PathBuf> {
    let path = match env_override.or_else(|| config.database_path.clone()) {
        Some(path) => path,
        None => project_dirs()?.data_dir().join(DB_FILE),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    Ok(path)
}

pub(crate) fn db_path_from_env() -> Option<PathBuf> {
    std::env::var_os(DB_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
