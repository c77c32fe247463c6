//! Configuration module for whatif-denoise.
//!
//! This module provides:
//! - Run configuration types assembled from CLI flags
//! - Validation for rules files and run configuration
//! - Rules file discovery and loading (JSON or YAML)
//! - Example rules file and JSON Schema generation
//!
//! # Rules File
//!
//! Place an `az-deployment-denoise.yml` (or `.json`) file in your project
//! root or `~/.config/az-deployment-denoise/`:
//!
//! ```yaml
//! rules:
//!   - providerNamespace: Microsoft.Web
//!     resourceType: sites
//!     propertyPath: properties.siteConfig.localMySqlEnabled
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{BehaviorConfig, DenoiseConfig, DenoiseConfigBuilder, OutputConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_rules,
    search_locations, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the rules file format.
///
/// Editors can use it for validation and autocompletion of
/// `az-deployment-denoise.yml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(crate::rules::RulesConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
