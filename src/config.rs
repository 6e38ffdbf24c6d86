//! Configuration management for `Wanderplan`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WanderplanError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `Wanderplan` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WanderplanConfig {
    /// Recommendation endpoint used by the client
    #[serde(default)]
    pub service: ServiceConfig,
    /// Language model used by the proxy server
    #[serde(default)]
    pub model: ModelConfig,
    /// Proxy server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recommendation endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the recommendation proxy
    #[serde(default = "default_service_base_url")]
    pub base_url: String,
    /// Path of the recommendation route
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key; falls back to the `GOOGLE_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Base URL of the generative language API
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    /// Model name
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Ask the model to normalise the starting city before recommending
    #[serde(default = "default_correct_starting_city")]
    pub correct_starting_city: bool,
}

/// Proxy server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Maximum accepted request body in KiB
    #[serde(default = "default_max_body_kb")]
    pub max_body_kb: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_service_base_url() -> String {
    "http://127.0.0.1:5007".to_string()
}

fn default_endpoint_path() -> String {
    "/api/gemini".to_string()
}

fn default_user_agent() -> String {
    format!("Wanderplan/{}", crate::VERSION)
}

fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model_name() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_correct_starting_city() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5007
}

fn default_max_body_kb() -> u32 {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_base_url(),
            endpoint_path: default_endpoint_path(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_model_base_url(),
            name: default_model_name(),
            correct_starting_city: default_correct_starting_city(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            max_body_kb: default_max_body_kb(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServiceConfig {
    /// Full URL of the recommendation route
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path
        )
    }
}

impl WanderplanConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides: WANDERPLAN__SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("WANDERPLAN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WanderplanConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.model.api_key.is_none() {
            config.model.api_key = std::env::var("GOOGLE_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wanderplan").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.service.base_url.is_empty() {
            self.service.base_url = default_service_base_url();
        }
        if self.service.endpoint_path.is_empty() {
            self.service.endpoint_path = default_endpoint_path();
        }
        if self.service.user_agent.is_empty() {
            self.service.user_agent = default_user_agent();
        }
        if self.model.base_url.is_empty() {
            self.model.base_url = default_model_base_url();
        }
        if self.model.name.is_empty() {
            self.model.name = default_model_name();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.max_body_kb == 0 {
            self.server.max_body_kb = default_max_body_kb();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // The key is only needed when serving; an empty one is always a mistake
        if let Some(api_key) = &self.model.api_key {
            if api_key.trim().is_empty() {
                return Err(WanderplanError::config(
                    "Model API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(WanderplanError::config("Server port cannot be 0").into());
        }

        if self.server.max_body_kb > 10 * 1024 {
            return Err(WanderplanError::config(
                "Server body limit cannot exceed 10240 KiB (10 MiB)",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WanderplanError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WanderplanError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Service base URL", &self.service.base_url),
            ("Model base URL", &self.model.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WanderplanError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if !self.service.endpoint_path.starts_with('/') {
            return Err(WanderplanError::config("Endpoint path must start with '/'").into());
        }

        Ok(())
    }
}
