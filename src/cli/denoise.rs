//! Denoise command handler.
//!
//! Implements the default command: read a what-if result, apply the rules
//! file, and print the denoised report.

use crate::config::{load_rules, DenoiseConfig, Validatable};
use crate::error::DenoiseError;
use crate::pipeline::{exit_codes, output_report, read_operation_result, run_denoise as denoise};
use crate::rules::{DenoiseOutcome, Rule, SuppressionReason};
use anyhow::{Context, Result};
use std::fmt::Write as _;

/// Run the denoise command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
#[allow(clippy::needless_pass_by_value)]
pub fn run_denoise(config: DenoiseConfig) -> Result<i32> {
    let quiet = config.behavior.quiet;

    let errors = config.validate();
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(DenoiseError::validation(message).into());
    }

    let (rules, rules_path) =
        load_rules(config.rules_file.as_deref()).context("Failed to load rules")?;
    if !quiet {
        tracing::info!(
            "Loaded {} rule(s) from {}",
            rules.rules.len(),
            rules_path.display()
        );
    }

    let result = read_operation_result(config.input.as_deref(), quiet)?;

    let explain_rules = config.behavior.explain.then(|| rules.rules.clone());
    let outcome = denoise(rules, result, quiet)?;

    if let Some(rules) = explain_rules {
        eprint!("{}", format_explanation(&outcome, &rules));
    }

    output_report(&config, &outcome.result)?;

    Ok(determine_exit_code(&config, &outcome))
}

fn determine_exit_code(config: &DenoiseConfig, outcome: &DenoiseOutcome) -> i32 {
    if config.behavior.fail_on_change && outcome.result.has_actionable_changes() {
        exit_codes::CHANGES_DETECTED
    } else {
        exit_codes::SUCCESS
    }
}

/// Describe every suppressed property change, one per line, followed by a
/// per-rule hit count.
#[must_use]
pub fn format_explanation(outcome: &DenoiseOutcome, rules: &[Rule]) -> String {
    let mut out = String::new();

    if outcome.suppressed.is_empty() {
        out.push_str("No property changes were suppressed.\n");
        return out;
    }

    out.push_str("Suppressed property changes:\n");
    for suppression in &outcome.suppressed {
        let reason = match suppression.reason {
            SuppressionReason::Rule { index } => {
                let description = rules
                    .get(index)
                    .map_or_else(|| "<unknown>".to_string(), Rule::description);
                format!("rule #{index} ({description})")
            }
            SuppressionReason::Collapsed => "collapsed, no remaining children".to_string(),
        };
        let _ = writeln!(
            out,
            "  {} {} [{}]: {}",
            suppression.resource_id, suppression.path, suppression.change_type, reason
        );
    }

    out.push_str("Rule hits:\n");
    for (index, rule) in rules.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{index} {}: {}",
            rule.description(),
            outcome.suppressed_by_rule(index)
        );
    }

    for resource_id in &outcome.reclassified {
        let _ = writeln!(out, "Reclassified to NoChange: {resource_id}");
    }
    out
}
