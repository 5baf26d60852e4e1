use inkline_syntax::{Rule, RuleError, RuleTable};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid rules: {0}")]
    InvalidRules(#[from] RuleError),
}

/// Rules as written in `rules.toml`, one `[[rule]]` table each.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(rename = "rule", default)]
    pub rules: Vec<Rule>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/inkline");
        PathBuf::from(config_dir.as_ref()).join("rules.toml")
    }

    /// Validates the rules in file order. No rules means the reference dialect.
    pub fn rule_table(&self) -> Result<RuleTable, ConfigError> {
        if self.rules.is_empty() {
            return Ok(RuleTable::reference());
        }
        Ok(RuleTable::new(self.rules.iter().cloned())?)
    }

    /// Expands `~` and environment variables in a user-supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
