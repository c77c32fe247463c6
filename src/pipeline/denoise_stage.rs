//! Denoise stage.
//!
//! Builds the rule engine from a loaded rules file and applies it to the
//! parsed what-if result.

use crate::model::OperationResult;
use crate::rules::{DenoiseOutcome, RuleEngine, RulesConfig};
use anyhow::Result;

use super::PipelineError;

/// Apply the rules to a what-if result.
pub fn run_denoise(
    rules: RulesConfig,
    result: OperationResult,
    quiet: bool,
) -> Result<DenoiseOutcome> {
    let rule_count = rules.rules.len();
    let engine = RuleEngine::new(rules).map_err(|e| PipelineError::DenoiseFailed {
        source: anyhow::Error::new(e).context("Failed to initialize rule engine"),
    })?;

    if !quiet {
        tracing::info!("Denoising with {} rule(s)...", rule_count);
    }

    let outcome = engine
        .denoise_owned(result)
        .map_err(|e| PipelineError::DenoiseFailed { source: e.into() })?;

    if !quiet {
        tracing::info!("{}", outcome.summary());
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Change, ChangeType, PropertyChange, PropertyChangeType};
    use crate::rules::Rule;

    const SITE: &str = "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Web/sites/app";

    #[test]
    fn test_run_denoise() {
        let rules = RulesConfig::new(vec![Rule::default()
            .provider_namespace("Microsoft.Web")
            .property_path("properties.siteConfig.localMySqlEnabled")]);
        let result = OperationResult::new(vec![Change::modify(
            SITE,
            vec![PropertyChange::object(
                "properties",
                vec![PropertyChange::object(
                    "siteConfig",
                    vec![PropertyChange::leaf(
                        "localMySqlEnabled",
                        PropertyChangeType::Modify,
                    )],
                )],
            )],
        )]);

        let outcome = run_denoise(rules, result, true).unwrap();
        assert_eq!(outcome.result.changes[0].change_type, ChangeType::NoChange);
        assert_eq!(outcome.summary().nodes_collapsed, 2);
    }

    #[test]
    fn test_run_denoise_bad_regex() {
        let rules = RulesConfig::new(vec![Rule::default().resource_name_regex("(")]);
        let err = run_denoise(rules, OperationResult::new(vec![]), true).unwrap_err();
        assert!(format!("{err:#}").contains("rule #0"));
    }
}
