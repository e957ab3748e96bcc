//! Configuration validation for the SWOT engine.
//!
//! Provides validation logic for configuration fields to ensure
//! all required values are present and within valid ranges.

use thiserror::Error;

use crate::config::{Config, ObservabilityConfig, ProviderConfig, ServerConfig, StorageConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.server.validate() {
            errors.push(e);
        }
        if let Err(e) = self.provider.validate() {
            errors.push(e);
        }
        if let Err(e) = self.storage.validate() {
            errors.push(e);
        }
        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }

    /// Load and validate configuration.
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidValue {
                field: "server.port".into(),
                reason: "must be between 1 and 65535".into(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "server.host".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> ValidationResult<()> {
        match self.kind.as_str() {
            "openai" => {
                let missing = self
                    .api_key
                    .as_deref()
                    .map(|k| k.trim().is_empty())
                    .unwrap_or(true);
                if missing {
                    return Err(ValidationError::MissingField {
                        field: "provider.api_key".into(),
                    });
                }
            }
            "ollama" => {}
            other => {
                return Err(ValidationError::InvalidValue {
                    field: "provider.kind".into(),
                    reason: format!("unknown provider '{other}' (expected openai or ollama)"),
                });
            }
        }

        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "provider.model".into(),
            });
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidValue {
                field: "provider.temperature".into(),
                reason: "must be between 0.0 and 2.0".into(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "provider.timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingField {
                field: "storage.data_dir".into(),
            });
        }
        if self.log_file.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "storage.log_file".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("unknown level '{}'", self.log_level),
            });
        }
        if self.log_format != "json" && self.log_format != "pretty" {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("unknown format '{}' (expected json or pretty)", self.log_format),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.provider.api_key = Some("sk-test".into());
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field } if field == "provider.api_key"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut config = Config::default();
        config.provider.kind = "ollama".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = valid_config();
        config.provider.kind = "carrier-pigeon".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.server.port = 0;
        config.observability.log_format = "xml".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::Multiple(ref errs) if errs.len() == 3));
    }

    #[test]
    fn test_temperature_range() {
        let mut config = valid_config();
        config.provider.temperature = 3.5;
        assert!(config.validate().is_err());
    }
}
