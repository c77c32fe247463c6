//! Denoise rules: configuration, matching, and tree pruning.
//!
//! A [`RulesConfig`] holds an ordered list of [`Rule`]s. [`RuleEngine`]
//! compiles them once and applies them to every `Modify` change of an
//! [`OperationResult`], removing the property changes the rules describe as
//! known noise.

mod config;
pub mod engine;
pub mod matcher;

pub use config::{Rule, RulesConfig};
pub use engine::{
    DenoiseOutcome, DenoiseSummary, PathContext, RuleEngine, Suppression, SuppressionReason,
};
pub use matcher::{rule_matches, CompiledRule, MatchContext, Predicate};

use crate::error::Result;
use crate::model::{OperationResult, PropertyChange};

/// Denoise a what-if result with the given rules.
///
/// The input is left untouched; the returned result has the same number of
/// changes in the same order.
pub fn denoise(result: &OperationResult, rules: &[Rule]) -> Result<OperationResult> {
    let engine = RuleEngine::from_rules(rules.to_vec())?;
    Ok(engine.denoise(result)?.result)
}

/// Prune a top-level delta belonging to `resource_id` with the given rules.
pub fn prune(
    delta: Vec<PropertyChange>,
    resource_id: &str,
    rules: &[Rule],
) -> Result<Vec<PropertyChange>> {
    RuleEngine::from_rules(rules.to_vec())?.prune_delta(delta, resource_id)
}
