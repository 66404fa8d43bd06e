use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP JSON-RPC endpoint
    pub rpc: Option<String>,

    /// WebSocket endpoint
    pub ws: Option<String>,

    /// IPC socket path
    pub ipc: Option<PathBuf>,

    /// Aggregator bytecode asset table (JSON)
    pub bytecode: Option<PathBuf>,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log: Option<String>,
}

impl Config {
    pub fn log_filter(&self) -> &str {
        self.log
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("info")
    }
}

/// Load the implicit config file; a missing or unreadable file yields defaults
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

/// Load an explicitly requested config file
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str::<Config>(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("MULTICALL_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("multicall").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("multicall").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "multicall", "multicall")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
