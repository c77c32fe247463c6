//! Rules file loading and discovery.
//!
//! Rules files are JSON or YAML and are discovered from a fixed set of
//! locations when no explicit path is given.

use super::validation::{ConfigError, Validatable};
use crate::rules::RulesConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Rules File Discovery
// ============================================================================

/// Standard rules file names to search for, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "az-deployment-denoise.json",
    "az-deployment-denoise.yml",
    "az-deployment-denoise.yaml",
    ".az-deployment-denoise.json",
    ".az-deployment-denoise.yml",
];

/// Directory name under the user config directory.
const CONFIG_DIR_NAME: &str = "az-deployment-denoise";

/// Discover a rules file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided (returned even if missing, so loading
///    reports it)
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/az-deployment-denoise/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    search_locations()
        .iter()
        .find_map(|dir| find_config_in_dir(dir))
}

/// Directories searched when no explicit path is given, in order.
#[must_use]
pub fn search_locations() -> Vec<PathBuf> {
    let mut dirs_to_search = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs_to_search.push(cwd);
    }
    if let Some(git_root) = find_git_root() {
        if !dirs_to_search.contains(&git_root) {
            dirs_to_search.push(git_root);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_search.push(config_dir.join(CONFIG_DIR_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_search.push(home);
    }

    dirs_to_search
}

/// Find a rules file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }

        current = current.parent()?;
    }
}

// ============================================================================
// Rules File Loading
// ============================================================================

/// Error type for rules file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// Explicit file not found
    NotFound(PathBuf),
    /// No rules file in any search location
    NoneDiscovered,
    /// IO error reading file
    Io(std::io::Error),
    /// JSON parsing error
    Json(serde_json::Error),
    /// YAML parsing error
    Yaml(serde_yaml_ng::Error),
    /// Parsed but failed validation
    Invalid {
        path: PathBuf,
        errors: Vec<ConfigError>,
    },
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Rules file not found: {}", path.display())
            }
            Self::NoneDiscovered => write!(
                f,
                "No rules file found (looked for {}); create one with `az-deployment-denoise config init`",
                CONFIG_FILE_NAMES.join(", ")
            ),
            Self::Io(e) => write!(f, "Failed to read rules file: {e}"),
            Self::Json(e) => write!(f, "Invalid rules file: {e}"),
            Self::Yaml(e) => write!(f, "Invalid rules file: {e}"),
            Self::Invalid { path, errors } => {
                write!(f, "Invalid rules file {}: ", path.display())?;
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "{}", messages.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) | Self::NoneDiscovered | Self::Invalid { .. } => None,
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Yaml(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigFileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<serde_yaml_ng::Error> for ConfigFileError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::Yaml(err)
    }
}

/// Whether the file should be read as JSON (by extension)
fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load and validate a rules file. `.json` files are read as JSON, anything
/// else as YAML.
pub fn load_config_file(path: &Path) -> Result<RulesConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config = if is_json(path) {
        RulesConfig::from_json(&content)?
    } else {
        RulesConfig::from_yaml(&content)?
    };

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigFileError::Invalid {
            path: path.to_path_buf(),
            errors,
        });
    }

    tracing::debug!(
        "Loaded {} rule(s) from {}",
        config.rules.len(),
        path.display()
    );
    Ok(config)
}

/// Discover and load the rules file.
pub fn load_rules(explicit_path: Option<&Path>) -> Result<(RulesConfig, PathBuf), ConfigFileError> {
    let path = discover_config_file(explicit_path).ok_or(ConfigFileError::NoneDiscovered)?;
    let config = load_config_file(&path)?;
    Ok((config, path))
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example rules file.
#[must_use]
pub fn generate_example_config() -> String {
    r#"# az-deployment-denoise rules
# ============================
#
# Place this file at one of:
#   - ./az-deployment-denoise.yml (or .json) in your project root
#   - ~/.config/az-deployment-denoise/az-deployment-denoise.yml for global rules
#
# Each rule suppresses the property changes it matches. All keys present in
# a rule must match (AND); any matching rule suppresses the change (OR).
#
# Available keys:
#   resourceGroupName   exact resource group name
#   providerNamespace   exact provider namespace, e.g. Microsoft.Web
#   resourceType        exact resource type, e.g. sites
#   resourceName        exact resource name
#   resourceNameRegex   regular expression searched in the resource name, in
#                       Rust `regex` syntax: lookaround and backreferences
#                       are not supported
#   propertyPath        full property path; array elements are written `[]`,
#                       e.g. properties.ipRules[]
#   propertyChangeType  Create, Delete, Modify, Array or NoEffect

rules:
  # Reported on every what-if run for App Service, never actually changes
  - providerNamespace: Microsoft.Web
    resourceType: sites
    propertyPath: properties.siteConfig.localMySqlEnabled

  # Properties the deployment would not affect
  - propertyChangeType: NoEffect
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
