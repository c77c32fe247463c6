//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod config;
mod denoise;

pub use config::{run_config_init, run_config_path, run_config_show};
pub use denoise::{format_explanation, run_denoise};

// Re-export config types used by handlers
pub use crate::config::DenoiseConfig;
