//! Validator configuration

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag key read from `#[tag(...)]` when none is configured
pub const DEFAULT_TAG_NAME: &str = "valid";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Settings applied when a validator is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Which `#[tag(key = "...")]` entry holds the rule string
    pub tag_name: String,
    /// Maximum traversal depth; unlimited when `None`
    pub max_depth: Option<usize>,
    /// Register the built-in rules before any caller rules
    pub default_rules: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            tag_name: DEFAULT_TAG_NAME.to_string(),
            max_depth: None,
            default_rules: true,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from `TAGVAL_*` environment variables, falling
    /// back to defaults for unset ones
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(tag_name) = lookup("TAGVAL_TAG_NAME") {
            config.tag_name = tag_name;
        }

        if let Some(depth) = lookup("TAGVAL_MAX_DEPTH") {
            config.max_depth = match depth.trim() {
                "" | "none" | "unlimited" => None,
                value => Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "max_depth".to_string(),
                    value: depth.clone(),
                    expected: "a positive integer or 'unlimited'".to_string(),
                })?),
            };
        }

        if let Some(flag) = lookup("TAGVAL_DEFAULT_RULES") {
            config.default_rules = match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "default_rules".to_string(),
                        value: flag,
                        expected: "true or false".to_string(),
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag_name.is_empty() {
            return Err(ConfigError::ValidationFailed {
                message: "tag_name must not be empty".to_string(),
            });
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::ValidationFailed {
                message: "max_depth must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ValidatorConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ValidatorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.tag_name, "valid");
        assert!(config.default_rules);
    }

    #[test]
    fn test_from_vars() {
        let config = load(&[
            ("TAGVAL_TAG_NAME", "check"),
            ("TAGVAL_MAX_DEPTH", "64"),
            ("TAGVAL_DEFAULT_RULES", "off"),
        ])
        .unwrap();

        assert_eq!(config.tag_name, "check");
        assert_eq!(config.max_depth, Some(64));
        assert!(!config.default_rules);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("TAGVAL_MAX_DEPTH", "deep")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("TAGVAL_MAX_DEPTH", "0")]),
            Err(ConfigError::ValidationFailed { .. })
        ));
        assert!(matches!(
            load(&[("TAGVAL_TAG_NAME", "")]),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ValidatorConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config.tag_name, "valid");
        assert_eq!(config.max_depth, Some(8));
    }
}
