//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `THNK_BACKEND__MODEL`, `THNK_OUTPUT__NO_COLOR`, ...
//! 3. `./thnk.toml`
//! 4. `--config FILE`, or the global file from [`AppConfig::config_path`]
//! 5. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the per-project config file.
pub const LOCAL_CONFIG: &str = "thnk.toml";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation backend settings.
    pub backend: BackendConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Declaration file lookup.
    #[serde(default)]
    pub thnkfile: ThnkfileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub provider: Provider,
    /// Model used when neither the Thnkfile nor `--model` names one.
    pub model: Option<String>,
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Openai,
    Echo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThnkfileConfig {
    pub path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                provider: Provider::Openai,
                model: None,
                base_url: thnk_adapters::backend::DEFAULT_BASE_URL.into(),
                api_key_env: "OPENAI_API_KEY".into(),
                timeout_secs: 120,
            },
            output: OutputConfig {
                no_color: false,
                format: "human".into(),
            },
            thnkfile: ThnkfileConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from every source in precedence order.
    ///
    /// `config_file` is the path the user passed via `--config`; it must
    /// exist. The global and local files are optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("backend.provider", "openai")?
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default("backend.api_key_env", defaults.backend.api_key_env)?
            .set_default("backend.timeout_secs", defaults.backend.timeout_secs)?
            .set_default("output.no_color", defaults.output.no_color)?
            .set_default("output.format", defaults.output.format)?;

        builder = match config_file {
            Some(path) => {
                debug!(config_path = %path.display(), "Using explicit config file");
                builder.add_source(File::from(path.as_path()).required(true))
            }
            None => builder.add_source(File::from(Self::config_path().as_path()).required(false)),
        };

        let config = builder
            .add_source(File::from(Path::new(LOCAL_CONFIG)).required(false))
            .add_source(
                Environment::with_prefix("THNK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `thnk.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "thnk", "thnk")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// Read one dotted key, rendered for display.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "backend.provider" => match self.backend.provider {
                Provider::Openai => "openai".to_string(),
                Provider::Echo => "echo".to_string(),
            },
            "backend.model" => self.backend.model.clone().unwrap_or_default(),
            "backend.base_url" => self.backend.base_url.clone(),
            "backend.api_key_env" => self.backend.api_key_env.clone(),
            "backend.timeout_secs" => self.backend.timeout_secs.to_string(),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => self.output.format.clone(),
            "thnkfile.path" => self
                .thnkfile
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }
}
