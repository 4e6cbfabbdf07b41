use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::CpfValidator;
use crate::telemetry::LogLevel;

/// Directory name under the per-user config root
const CONFIG_DIR_NAME: &str = "pulse-backoffice";

/// Console configuration.
///
/// Read from `<config>/pulse-backoffice/config.toml` when present, with
/// environment overrides on top. Every field has a default so a fresh
/// machine works against a local backend without any file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the REST backend
    pub api_url: String,

    /// Redirect URI forced onto the OAuth authorize URL
    pub oauth_redirect_uri: Option<String>,

    /// Fallback authorize URL when provider discovery gives none
    pub oauth_google_url: Option<String>,

    /// Accept the seed demo CPFs without a checksum pass.
    ///
    /// Demo environments only; must stay off in production.
    pub demo_fixtures: bool,

    /// Entries below this level are dropped from the event log
    pub min_log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            oauth_redirect_uri: None,
            oauth_google_url: None,
            demo_fixtures: false,
            min_log_level: LogLevel::Debug,
        }
    }
}

impl AppConfig {
    /// Per-user configuration directory for the console
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("could not resolve the user config directory")?;
        Ok(base.join(CONFIG_DIR_NAME))
    }

    /// Default path of the configuration file
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the configuration: file when present, then env overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit file, without env overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(api_url) = env::var("PULSE_API_URL") {
            if !api_url.trim().is_empty() {
                self.api_url = api_url;
            }
        }

        if let Ok(redirect) = env::var("PULSE_OAUTH_REDIRECT_URI") {
            if !redirect.trim().is_empty() {
                self.oauth_redirect_uri = Some(redirect);
            }
        }

        if let Ok(fixtures) = env::var("PULSE_DEMO_FIXTURES") {
            self.demo_fixtures = matches!(fixtures.trim(), "1" | "true" | "yes");
        }

        if let Ok(level) = env::var("PULSE_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                self.min_log_level = level;
            }
        }
    }

    /// CPF policy derived from this configuration
    pub fn cpf_validator(&self) -> CpfValidator {
        if self.demo_fixtures {
            CpfValidator::with_seed_fixtures()
        } else {
            CpfValidator::strict()
        }
    }
}
