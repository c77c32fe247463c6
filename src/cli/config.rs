//! Config command handlers.
//!
//! `config show`, `config path` and `config init` inspect or create the
//! rules file that the denoise command discovers.

use crate::config::{
    discover_config_file, generate_example_config, load_rules, search_locations,
    CONFIG_FILE_NAMES,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Print the effective rules as YAML, with the file they came from on stderr.
pub fn run_config_show(explicit_path: Option<&Path>) -> Result<()> {
    let (rules, loaded_from) = load_rules(explicit_path).context("Failed to load rules")?;
    eprintln!("# Loaded from: {}", loaded_from.display());
    let yaml = serde_yaml_ng::to_string(&rules).context("failed to serialize rules")?;
    print!("{yaml}");
    Ok(())
}

/// Print the rules file search paths and the file that would be used.
pub fn run_config_path(explicit_path: Option<&Path>) -> Result<()> {
    eprintln!("Rules file search paths (in order):");
    for dir in search_locations() {
        eprintln!("  {}", dir.display());
    }
    eprintln!();
    eprintln!("Recognized file names:");
    for name in CONFIG_FILE_NAMES {
        eprintln!("  {name}");
    }
    eprintln!();
    match discover_config_file(explicit_path) {
        Some(path) => eprintln!("Active rules file: {}", path.display()),
        None => eprintln!("No rules file found."),
    }
    Ok(())
}

/// Write an example rules file into `dir`, returning its path.
///
/// An existing file is only replaced when `force` is set.
pub fn run_config_init(dir: &Path, force: bool) -> Result<PathBuf> {
    let target = dir.join("az-deployment-denoise.yml");
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists. Remove it first or pass --force to overwrite.",
            target.display()
        );
    }
    std::fs::write(&target, generate_example_config())
        .with_context(|| format!("failed to write {}", target.display()))?;
    eprintln!("Created {}", target.display());
    Ok(target)
}
