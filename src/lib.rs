//! **Remove known noise from Azure deployment what-if results.**
//!
//! `az deployment ... what-if` reports property changes that never actually
//! happen: server-populated defaults, normalized casing, read-only flags.
//! `whatif-denoise` takes the JSON what-if result, applies a list of
//! user-written rules that describe such noise, and returns the same document
//! with the matching property changes removed. Resources left with nothing to
//! change are reclassified from `Modify` to `NoChange`.
//!
//! It powers the `az-deployment-denoise` command-line tool and can be used as
//! a library.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the what-if document ([`OperationResult`], [`Change`],
//!   [`PropertyChange`]) and the resource identifier parser
//!   ([`ResourceDescriptor`]).
//! - **[`rules`]**: the rule configuration ([`RulesConfig`], [`Rule`]) and the
//!   [`RuleEngine`], which matches rules against delta nodes, prunes the delta
//!   trees, and records what was suppressed.
//! - **[`config`]**: rules file discovery, loading and validation.
//! - **[`pipeline`]**: read → denoise → report stages used by the CLI.
//! - **[`reports`]**: the Azure CLI style pretty printer and the JSON writer.
//!
//! ## Getting Started
//!
//! ```no_run
//! use whatif_denoise::{denoise, ChangeType, OperationResult, Rule};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let content = std::fs::read_to_string("whatif.json")?;
//!     let result = OperationResult::from_json(&content)?;
//!
//!     let rules = vec![Rule::default()
//!         .provider_namespace("Microsoft.Web")
//!         .property_path("properties.siteConfig.localMySqlEnabled")];
//!
//!     let denoised = denoise(&result, &rules)?;
//!     println!(
//!         "{} of {} resource(s) still modified",
//!         denoised.count(ChangeType::Modify),
//!         denoised.changes.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Explaining What Was Removed
//!
//! [`RuleEngine::denoise`] returns a [`DenoiseOutcome`] that lists every
//! suppressed node and the rule responsible.
//!
//! ```no_run
//! use whatif_denoise::config::load_config_file;
//! use whatif_denoise::rules::SuppressionReason;
//! use whatif_denoise::{OperationResult, RuleEngine};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rules = load_config_file(Path::new("az-deployment-denoise.yml"))?;
//!     let engine = RuleEngine::new(rules)?;
//!
//!     let result = OperationResult::from_json(&std::fs::read_to_string("whatif.json")?)?;
//!     let outcome = engine.denoise(&result)?;
//!     for s in &outcome.suppressed {
//!         if let SuppressionReason::Rule { index } = s.reason {
//!             println!("{} {} removed by rule #{index}", s.resource_id, s.path);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Config structs legitimately use many bools for toggle flags
    clippy::struct_excessive_bools,
    // Variable names like `before`/`after` are clear in context
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod rules;

// Re-export main types for convenience
pub use config::{BehaviorConfig, DenoiseConfig, OutputConfig};
pub use config::{ConfigError, Validatable};
pub use error::{DenoiseError, ErrorContext, Result};
pub use model::{
    Change, ChangeType, DeltaKind, OperationResult, PropertyChange, PropertyChangeType,
    ResourceDescriptor,
};
pub use reports::{ReportFormat, ReportGenerator};
pub use rules::{denoise, prune, DenoiseOutcome, Rule, RuleEngine, RulesConfig};
