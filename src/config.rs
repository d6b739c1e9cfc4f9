use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::MotionError;

pub const API_KEY_VAR: &str = "MOTION_API_KEY";
const DEFAULT_API_URL: &str = "https://api.usemotion.com/v1";
const DEFAULT_TEMPLATES_DIR: &str = "templates";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub templates_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_API_URL)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_DIR))
    }
}

/// The Motion API key. Only ever sourced from the environment.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MotionError> {
        match lookup(API_KEY_VAR) {
            Some(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(MotionError::MissingApiKey),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".motion-templates")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).with_context(|| "Failed to parse config.toml")
}
