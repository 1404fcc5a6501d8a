use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub command: String,
    pub privileged_schemes: Vec<String>,
    pub overlay_element_id: String,
    pub placeholder: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            command: "open-tab-switcher".to_string(),
            privileged_schemes: vec![
                "chrome://".to_string(),
                "chrome-extension://".to_string(),
                "edge://".to_string(),
                "about:".to_string(),
            ],
            overlay_element_id: "tab-switcher-overlay".to_string(),
            placeholder: "Enter tab index or title...".to_string(),
            log_level: "info".to_string(),
            log_dir: base.join("logs"),
            config_path: base.join("config.toml"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn stable_app_data_dir() -> PathBuf {
    std::env::temp_dir().join("tabspot")
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.command.trim().is_empty() {
        return Err(ConfigError::Invalid("command is required".into()));
    }

    if cfg.overlay_element_id.trim().is_empty()
        || cfg.overlay_element_id.chars().any(char::is_whitespace)
    {
        return Err(ConfigError::Invalid(
            "overlay_element_id must be a non-empty id without whitespace".into(),
        ));
    }

    if cfg.privileged_schemes.iter().any(|scheme| scheme.trim().is_empty()) {
        return Err(ConfigError::Invalid(
            "privileged_schemes must not contain blank entries".into(),
        ));
    }

    if !LOG_LEVELS.contains(&cfg.log_level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::Invalid(format!(
            "log_level must be one of {}",
            LOG_LEVELS.join(", ")
        )));
    }

    Ok(())
}

/// Loads config from `path`, or the default location. A missing file yields
/// the defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut cfg = match fs::read_to_string(&path) {
        Ok(raw) => toml::from_str::<Config>(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    cfg.config_path = path;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg)?;
    let encoded = toml::to_string_pretty(cfg)?;
    if let Some(parent) = cfg.config_path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Io {
        path: cfg.config_path.clone(),
        source,
    })
}
