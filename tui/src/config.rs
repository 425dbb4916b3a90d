//! Configuration: a small TOML file under the user config dir, with CLI
//! flags layered on top.

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use stacks_browser::FilterMode;
use std::path::Path;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8212";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigToml {
    base_url: Option<String>,
    token: Option<String>,
    filter_mode: Option<String>,
    log_filter: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    pub filter_mode: FilterMode,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            filter_mode: FilterMode::Hide,
            log_filter: "info".to_string(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stacks").join("config.toml"))
}

pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config_path().filter(|path| path.exists()),
    };
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let parsed: ConfigToml = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;

    let defaults = Config::default();
    Ok(Config {
        base_url: parsed.base_url.unwrap_or(defaults.base_url),
        token: parsed.token,
        filter_mode: match parsed.filter_mode.as_deref() {
            Some("dim") => FilterMode::Dim,
            _ => FilterMode::Hide,
        },
        log_filter: parsed.log_filter.unwrap_or(defaults.log_filter),
    })
}
