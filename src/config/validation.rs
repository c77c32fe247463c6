//! Configuration validation for whatif-denoise.
//!
//! Provides validation traits and implementations for rules files and run
//! configuration.

use super::types::{DenoiseConfig, OutputConfig};
use crate::rules::{CompiledRule, Rule, RulesConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for RulesConfig {
    fn validate(&self) -> Vec<ConfigError> {
        if self.rules.is_empty() {
            return vec![ConfigError {
                field: "rules".to_string(),
                message: "no rules defined".to_string(),
            }];
        }

        self.rules
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| validate_rule(index, rule))
            .collect()
    }
}

fn validate_rule(index: usize, rule: &Rule) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if rule.is_unconstrained() {
        errors.push(ConfigError {
            field: format!("rules[{index}]"),
            message: "empty rule: at least one predicate is required".to_string(),
        });
    }

    if let Err(e) = CompiledRule::compile(index, rule) {
        errors.push(ConfigError {
            field: format!("rules[{index}].resourceNameRegex"),
            message: std::error::Error::source(&e)
                .map_or_else(|| e.to_string(), ToString::to_string),
        });
    }

    errors
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Validate output file path if specified
        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError {
                        field: "output.file".to_string(),
                        message: format!("Parent directory does not exist: {}", parent.display()),
                    });
                }
            }
        }

        errors
    }
}

impl Validatable for DenoiseConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref input) = self.input {
            if !input.exists() {
                errors.push(ConfigError {
                    field: "input".to_string(),
                    message: format!("File not found: {}", input.display()),
                });
            }
        }

        if let Some(ref rules_file) = self.rules_file {
            if !rules_file.exists() {
                errors.push(ConfigError {
                    field: "rules_file".to_string(),
                    message: format!("File not found: {}", rules_file.display()),
                });
            }
        }

        errors.extend(self.output.validate());
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyChangeType;
    use std::path::PathBuf;

    #[test]
    fn test_valid_rules() {
        let config = RulesConfig::new(vec![Rule::default()
            .provider_namespace("Microsoft.Web")
            .resource_type("sites")
            .property_path("properties.siteConfig.localMySqlEnabled")]);
        assert!(config.is_valid());
    }

    #[test]
    fn test_no_rules() {
        let errors = RulesConfig::default().validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("no rules"));
    }

    #[test]
    fn test_empty_rule() {
        let config = RulesConfig::new(vec![
            Rule::default().property_change_type(PropertyChangeType::NoEffect),
            Rule::default(),
        ]);
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rules[1]");
        assert!(errors[0].message.contains("empty"));
    }

    #[test]
    fn test_invalid_regex() {
        let config = RulesConfig::new(vec![Rule::default().resource_name_regex("[a-")]);
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rules[0].resourceNameRegex");
        assert!(errors[0].message.contains("[a-"));
    }

    #[test]
    fn test_output_parent_must_exist() {
        let config = OutputConfig {
            file: Some(PathBuf::from("/nonexistent-dir-for-test/out.txt")),
            ..OutputConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "output.file");

        let bare = OutputConfig {
            file: Some(PathBuf::from("out.txt")),
            ..OutputConfig::default()
        };
        assert!(bare.is_valid());
    }

    #[test]
    fn test_missing_input_reported() {
        let config = DenoiseConfig {
            input: Some(PathBuf::from("/nonexistent/whatif.json")),
            ..DenoiseConfig::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "input"));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError {
            field: "rules".to_string(),
            message: "no rules defined".to_string(),
        };
        assert_eq!(error.to_string(), "rules: no rules defined");
    }
}
