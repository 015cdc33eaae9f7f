use crate::models::QuestlineConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the settings file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "Questline Config.yaml";

/// Prefix for environment variable overrides, e.g. `QUESTLINE_DEBUG_MODE=true`.
pub const ENV_PREFIX: &str = "QUESTLINE";

/// Configuration manager for loading and saving `Questline Config.yaml`.
///
/// Settings are layered, later sources winning:
/// 1. [`QuestlineConfig::default`]
/// 2. the YAML file, if present
/// 3. `QUESTLINE_*` environment variables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load settings from defaults, the YAML file and the environment.
    pub fn load_config(&self) -> Result<QuestlineConfig> {
        self.load_with_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(&self, environment: Environment) -> Result<QuestlineConfig> {
        if self.config_path.exists() {
            tracing::info!("Loading config from {}", self.config_path);
        } else {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let settings = Config::builder()
            .add_source(File::new(self.config_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(environment.try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: QuestlineConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::debug!("Effective config: {:?}", config);
        Ok(config)
    }

    /// Save settings to the YAML file.
    pub fn save_config(&self, config: &QuestlineConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
