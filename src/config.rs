use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::Interval;

pub const DEFAULT_STORAGE_KEY: &str = "financialEntries";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interval used by `forecast`/`export` when none is passed.
    #[serde(default)]
    pub default_interval: Interval,

    /// Key the entry list is stored under.
    ///
    /// If missing (older configs), it is auto-filled with [`DEFAULT_STORAGE_KEY`].
    #[serde(default)]
    pub storage_key: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_interval: Interval::default(),
            storage_key: Some(DEFAULT_STORAGE_KEY.to_string()),
            created_at: Utc::now(),
        }
    }
}

impl AppConfig {
    pub fn storage_key(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

pub fn app_paths(override_home: Option<PathBuf>) -> Result<AppPaths> {
    if let Some(home) = override_home {
        return Ok(AppPaths {
            config_dir: home.join("config"),
            data_dir: home.join("data"),
        });
    }

    let proj = ProjectDirs::from("com", "doughflow", "doughflow")
        .context("Failed to resolve platform directories")?;

    Ok(AppPaths {
        config_dir: proj.config_dir().to_path_buf(),
        data_dir: proj.data_dir().to_path_buf(),
    })
}

pub fn load_or_init_config(paths: &AppPaths) -> Result<(AppConfig, PathBuf)> {
    fs::create_dir_all(&paths.config_dir)
        .with_context(|| format!("Failed to create config dir {}", paths.config_dir.display()))?;

    let cfg_path = paths.config_dir.join("config.json");
    if !cfg_path.exists() {
        let cfg = AppConfig::default();
        write_config(&cfg_path, &cfg)?;
        info!(path = %cfg_path.display(), "initialized config");
        return Ok((cfg, cfg_path));
    }

    let raw = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Failed to read {}", cfg_path.display()))?;
    let mut cfg: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", cfg_path.display()))?;

    // Auto-migrate older config versions.
    let mut changed = false;
    if cfg.storage_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        cfg.storage_key = Some(DEFAULT_STORAGE_KEY.to_string());
        changed = true;
    }
    if changed {
        write_config(&cfg_path, &cfg)?;
    }

    Ok((cfg, cfg_path))
}

pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
