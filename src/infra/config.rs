//! Configuration management infrastructure.
//!
//! This module provides configuration file support, allowing users to save
//! and load the default key material, signaturelet and module search settings.

use crate::domain::constants::{
    SELOADER_SIGNATURELET_ID, SELSIGN_CA_CERT, SELSIGN_CERT, SELSIGN_KEY, SIGNATURELET_DIR,
    SIGNATURELET_EXTENSION, SIGNATURELET_SEARCH_PATH_VAR,
};
use crate::infra::error::{SigningError, SigningResult};
use crate::services::loader::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration with all signing defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignletConfiguration {
    /// PEM private key used when none is given
    pub key: PathBuf,

    /// PEM signing certificate used when none is given
    pub cert: PathBuf,

    /// CA certificates appended after the signing certificate when they exist
    pub ca_certs: Vec<PathBuf>,

    /// Signaturelet used when none is given
    pub signaturelet: String,

    /// Install directory probed first for signaturelet modules
    pub signaturelet_dir: PathBuf,

    /// Environment variable holding the module search path
    pub search_path_var: String,

    /// File extension of signaturelet modules
    pub module_extension: String,

    /// Whether to show verbose output
    pub verbose: bool,
}

impl Default for SignletConfiguration {
    fn default() -> Self {
        Self {
            key: PathBuf::from(SELSIGN_KEY),
            cert: PathBuf::from(SELSIGN_CERT),
            ca_certs: vec![PathBuf::from(SELSIGN_CA_CERT)],
            signaturelet: SELOADER_SIGNATURELET_ID.to_string(),
            signaturelet_dir: PathBuf::from(SIGNATURELET_DIR),
            search_path_var: SIGNATURELET_SEARCH_PATH_VAR.to_string(),
            module_extension: SIGNATURELET_EXTENSION.to_string(),
            verbose: false,
        }
    }
}

impl SignletConfiguration {
    /// Loader settings derived from this configuration.
    #[must_use]
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            install_dir: self.signaturelet_dir.clone(),
            search_path_var: self.search_path_var.clone(),
            extension: self.module_extension.clone(),
        }
    }

    /// Signing certificate followed by the CA certificates present on disk.
    #[must_use]
    pub fn default_certs(&self) -> Vec<PathBuf> {
        std::iter::once(self.cert.clone())
            .chain(self.ca_certs.iter().filter(|p| p.exists()).cloned())
            .collect()
    }

    /// Validate configuration values
    pub fn validate(&self) -> SigningResult<()> {
        if self.signaturelet.is_empty() {
            return Err(SigningError::ConfigurationError(
                "Default signaturelet must not be empty".to_string(),
            ));
        }

        if self.search_path_var.is_empty() || self.search_path_var.contains(['=', '\0']) {
            return Err(SigningError::ConfigurationError(format!(
                "Invalid search path variable name: {:?}",
                self.search_path_var
            )));
        }

        if self.module_extension.is_empty() || self.module_extension.contains(['.', '/']) {
            return Err(SigningError::ConfigurationError(format!(
                "Invalid module extension: {:?}",
                self.module_extension
            )));
        }

        Ok(())
    }
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        match dirs::config_dir() {
            Some(config_dir) => config_dir.join("libsign").join("config.toml"),
            None => PathBuf::from("libsign-config.toml"),
        }
    }

    /// Load configuration from file, falling back to defaults if it doesn't exist
    pub fn load_or_default(&self) -> SigningResult<SignletConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "Configuration file not found, using defaults: {}",
                self.config_path.display()
            );
            Ok(SignletConfiguration::default())
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> SigningResult<SignletConfiguration> {
        log::debug!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to read config file {}: {e}",
                self.config_path.display()
            ))
        })?;

        let config: SignletConfiguration = toml::from_str(&content).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &SignletConfiguration) -> SigningResult<()> {
        config.validate()?;
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SigningError::ConfigurationError(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to write config file {}: {e}",
                self.config_path.display()
            ))
        })?;

        Ok(())
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> SigningResult<()> {
        let mut config = self.load_or_default()?;

        match key {
            "key" => config.key = PathBuf::from(value),
            "cert" => config.cert = PathBuf::from(value),
            "ca_certs" => {
                config.ca_certs = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }
            "signaturelet" => config.signaturelet = value.to_string(),
            "signaturelet_dir" => config.signaturelet_dir = PathBuf::from(value),
            "search_path_var" => config.search_path_var = value.to_string(),
            "module_extension" => config.module_extension = value.to_string(),
            "verbose" => {
                config.verbose = value.parse().map_err(|_| {
                    SigningError::ConfigurationError(format!("Invalid boolean value: {value}"))
                })?;
            }
            _ => {
                return Err(SigningError::ConfigurationError(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> SigningResult<String> {
        let config = self.load_or_default()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("JSON export failed: {e}"))),
            ExportFormat::Yaml => serde_yaml::to_string(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("YAML export failed: {e}"))),
        }
    }

    /// Import configuration from a string
    pub fn import_config(&self, content: &str, format: ExportFormat) -> SigningResult<()> {
        let config: SignletConfiguration = match format {
            ExportFormat::Toml => toml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("TOML import failed: {e}"))
            })?,
            ExportFormat::Json => serde_json::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("JSON import failed: {e}"))
            })?,
            ExportFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("YAML import failed: {e}"))
            })?,
        };

        self.save(&config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration export/import formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Toml,
    Json,
    Yaml,
}
