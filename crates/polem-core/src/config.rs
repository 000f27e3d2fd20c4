//! Polem Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults matching the tagger/NER label conventions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Label discriminators used by the pipeline
    pub pipeline: PipelineConfig,

    /// Morphological engine configuration
    pub engine: EngineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT".to_string(),
                value: port,
            })?;
        }

        // Pipeline
        if let Ok(service) = std::env::var("POLEM_NER_SERVICE") {
            config.pipeline.ner_service = service;
        }
        if let Ok(field) = std::env::var("POLEM_POS_FIELD") {
            config.pipeline.pos_field = field;
        }
        if let Ok(field) = std::env::var("POLEM_LEMMA_FIELD") {
            config.pipeline.lemma_field = field;
        }

        // Engine
        if let Ok(path) = std::env::var("POLEM_DICTIONARY") {
            config.engine.dictionary_path = Some(PathBuf::from(path));
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_bool("LOG_JSON", &json)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.server.host != defaults.server.host {
            self.server.host = env_config.server.host;
        }
        if env_config.server.port != defaults.server.port {
            self.server.port = env_config.server.port;
        }
        if env_config.pipeline.ner_service != defaults.pipeline.ner_service {
            self.pipeline.ner_service = env_config.pipeline.ner_service;
        }
        if env_config.pipeline.pos_field != defaults.pipeline.pos_field {
            self.pipeline.pos_field = env_config.pipeline.pos_field;
        }
        if env_config.pipeline.lemma_field != defaults.pipeline.lemma_field {
            self.pipeline.lemma_field = env_config.pipeline.lemma_field;
        }
        if env_config.engine.dictionary_path.is_some() {
            self.engine.dictionary_path = env_config.engine.dictionary_path;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("pipeline.ner_service", &self.pipeline.ner_service),
            ("pipeline.pos_field", &self.pipeline.pos_field),
            ("pipeline.lemma_field", &self.pipeline.lemma_field),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingRequired(key.to_string()));
            }
        }
        if self.pipeline.pos_field == self.pipeline.lemma_field {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.lemma_field".to_string(),
                value: self.pipeline.lemma_field.clone(),
            });
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9080,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Service and field names the pipeline selects labels by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `serviceName` of named-entity labels
    pub ner_service: String,

    /// `fieldName` of part-of-speech tag labels
    pub pos_field: String,

    /// `fieldName` of lemma candidate labels
    pub lemma_field: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ner_service: "NER".to_string(),
            pos_field: "posTag".to_string(),
            lemma_field: "lemmas".to_string(),
        }
    }
}

/// Morphological engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// TOML dictionary of phrase overrides
    pub dictionary_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl From<ConfigError> for crate::PolemError {
    fn from(err: ConfigError) -> Self {
        crate::PolemError::ConfigError(err.to_string())
    }
}
