//! CLI Configuration
//!
//! `~/.kvq/config.toml`, or `~/.kvq/config.<profile>.toml` with `--profile`.

use crate::error::CliError;
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub default_format: Option<OutputFormat>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self, CliError> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf, CliError> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf, CliError> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("cannot find home directory".into()))?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".kvq").join(filename))
    }
}

/// Show only the start of a token
pub fn mask(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    format!("{visible}****")
}
