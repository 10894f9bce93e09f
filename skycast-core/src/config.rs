use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    prompt::DEFAULT_LANGUAGE,
    provider::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL},
};

/// Environment variables checked, in order, before the stored API key.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Used when neither a location nor coordinates are given and no default is configured.
pub const FALLBACK_LOCATION: &str = "Beijing";

/// Settings for the upstream model.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    /// Model name, e.g. "gemini-3-flash-preview".
    pub name: Option<String>,
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Location used when none is given on the command line.
    pub default_location: Option<String>,

    /// Language for summaries, conditions and tips, e.g. "English".
    pub language: Option<String>,

    /// Example TOML:
    /// [model]
    /// api_key = "..."
    /// name = "gemini-3-flash-preview"
    #[serde(default)]
    pub model: ModelConfig,
}

impl Config {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Result<String> {
        self.resolve_api_key(api_key_from_env(|var| std::env::var(var).ok()))
    }

    pub fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .or_else(|| self.model.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `skycast configure` or set the GEMINI_API_KEY environment variable."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.model.api_key = Some(api_key);
    }

    pub fn model_name(&self) -> &str {
        non_blank(self.model.name.as_deref()).unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        non_blank(self.model.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn language(&self) -> &str {
        non_blank(self.language.as_deref()).unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn default_location(&self) -> &str {
        non_blank(self.default_location.as_deref()).unwrap_or(FALLBACK_LOCATION)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// First non-blank key among [`API_KEY_ENV_VARS`].
fn api_key_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .find_map(|var| lookup(*var).filter(|key| !key.trim().is_empty()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
