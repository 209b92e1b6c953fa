//! Optional on-disk defaults for the `ward` command.
//!
//! The file lives at `$WARD_CONFIG_PATH` or `<config dir>/ward/config.json`.
//! A missing file means "no defaults"; a malformed one is reported and
//! ignored so a broken config never blocks a run.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs_next::{config_dir, home_dir};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use ward_engine::EvaluationMode;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "WARD_CONFIG_PATH";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardConfig {
    /// Attribute files loaded before any passed on the command line.
    pub attrs: Vec<PathBuf>,
    /// Alias profile name → canonical profile name.
    pub aliases: IndexMap<String, String>,
    pub mode: Option<EvaluationMode>,
}

impl WardConfig {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "Failed to read config file; using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "Failed to parse config file; using defaults");
                Self::default()
            }
        }
    }
}

/// Get the default path for the config file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(path.trim());
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ward")
        .join("config.json")
}

fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(path)
}
