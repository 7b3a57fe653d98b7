// Global configuration management

use crate::engine::{DEFAULT_QUALITY, clamp_quality};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// CRF used when --crf is not given (clamped to 18-25)
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Replace the original file instead of writing ffmpeg-red-<name>
    #[serde(default)]
    pub overwrite_original: bool,

    /// Write output into `output_directory` instead of next to the input
    #[serde(default)]
    pub save_to_different_location: bool,

    /// Last chosen output folder
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Replace spaces and special characters in generated file names
    #[serde(default)]
    pub sanitize_file_name: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json: bool,
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            overwrite_original: false,
            save_to_different_location: false,
            output_directory: None,
            sanitize_file_name: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl DefaultsConfig {
    /// Configured quality, pulled back into the range the CLI offers
    pub fn clamped_quality(&self) -> u8 {
        clamp_quality(self.quality as i64)
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("ffred")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("ffred")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();

            // Not fatal: read-only home directories still get built-in defaults
            if let Err(e) = config.save_to(&config_path) {
                eprintln!("Warning: Could not create default config file: {:#}", e);
                eprintln!(
                    "Using built-in defaults. Run 'ffred init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }
}
