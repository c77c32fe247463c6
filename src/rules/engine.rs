//! Rule engine: tree pruning and operation result denoising.
//!
//! The engine walks each `Modify` change's delta tree, drops every node a
//! rule matches (together with its subtree), and collapses composite nodes
//! whose children were all dropped. A change whose delta ends up empty is
//! reclassified as `NoChange`; it is never removed from the result.

use rayon::prelude::*;
use std::fmt;

use super::config::{Rule, RulesConfig};
use super::matcher::{CompiledRule, MatchContext};
use crate::error::{ErrorContext, Result};
use crate::model::{
    Change, ChangeType, DeltaKind, OperationResult, PropertyChange, PropertyChangeType,
    ResourceDescriptor,
};

/// Position of a node inside its resource's delta tree.
///
/// Array elements contribute `[]` instead of their index, so rules can
/// address "any element" but never a specific one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathContext<'a> {
    prefix: &'a str,
    inside_array: bool,
}

impl<'a> PathContext<'a> {
    /// Context for top-level delta nodes
    #[must_use]
    pub const fn root() -> Self {
        Self {
            prefix: "",
            inside_array: false,
        }
    }

    /// Context for the children of a node with the given full path
    #[must_use]
    pub const fn children_of(full_path: &'a str, parent_is_array: bool) -> Self {
        Self {
            prefix: full_path,
            inside_array: parent_is_array,
        }
    }

    /// Full path of a node whose local path is `local`
    #[must_use]
    pub fn full_path(&self, local: &str) -> String {
        if self.inside_array {
            format!("{}[]", self.prefix)
        } else if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}.{}", self.prefix, local)
        }
    }
}

/// Why a node disappeared from the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionReason {
    /// Matched the rule at this index
    Rule { index: usize },
    /// Composite node left without children
    Collapsed,
}

/// Record of one removed delta node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    pub resource_id: String,
    /// Full path of the removed node
    pub path: String,
    pub change_type: PropertyChangeType,
    pub reason: SuppressionReason,
}

/// Pruned result plus a log of what was removed
#[derive(Debug, Clone)]
pub struct DenoiseOutcome {
    pub result: OperationResult,
    pub suppressed: Vec<Suppression>,
    /// Resource ids reclassified from `Modify` to `NoChange`
    pub reclassified: Vec<String>,
}

impl DenoiseOutcome {
    /// Number of nodes removed by the rule at `index`
    #[must_use]
    pub fn suppressed_by_rule(&self, index: usize) -> usize {
        self.suppressed
            .iter()
            .filter(|s| s.reason == SuppressionReason::Rule { index })
            .count()
    }

    #[must_use]
    pub fn summary(&self) -> DenoiseSummary {
        DenoiseSummary {
            changes: self.result.changes.len(),
            nodes_suppressed: self
                .suppressed
                .iter()
                .filter(|s| matches!(s.reason, SuppressionReason::Rule { .. }))
                .count(),
            nodes_collapsed: self
                .suppressed
                .iter()
                .filter(|s| s.reason == SuppressionReason::Collapsed)
                .count(),
            reclassified: self.reclassified.len(),
        }
    }
}

/// Counts describing one denoise run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenoiseSummary {
    pub changes: usize,
    pub nodes_suppressed: usize,
    pub nodes_collapsed: usize,
    pub reclassified: usize,
}

impl fmt::Display for DenoiseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} change(s), {} property change(s) suppressed, {} collapsed, {} resource(s) reclassified to NoChange",
            self.changes, self.nodes_suppressed, self.nodes_collapsed, self.reclassified
        )
    }
}

/// Per-change result before merging
struct ChangeOutcome {
    change: Change,
    suppressed: Vec<Suppression>,
    reclassified: bool,
}

/// Engine applying a fixed rule list to what-if results
#[derive(Debug)]
pub struct RuleEngine {
    config: RulesConfig,
    compiled: Vec<CompiledRule>,
}

impl RuleEngine {
    /// Create a new rule engine, compiling every rule up front.
    pub fn new(config: RulesConfig) -> Result<Self> {
        let compiled = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| CompiledRule::compile(index, rule))
            .collect::<Result<Vec<_>>>()?;

        for rule in compiled.iter().filter(|r| r.rule().is_unconstrained()) {
            tracing::warn!(
                "Rule #{} defines no predicates and suppresses every property change",
                rule.index()
            );
        }

        Ok(Self { config, compiled })
    }

    /// Create an engine from a bare rule list
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        Self::new(RulesConfig::new(rules))
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &RulesConfig {
        &self.config
    }

    #[must_use]
    pub fn compiled_rules(&self) -> &[CompiledRule] {
        &self.compiled
    }

    /// Index of the first rule matching the context
    #[must_use]
    pub fn matching_rule(&self, ctx: &MatchContext<'_>) -> Option<usize> {
        self.compiled
            .iter()
            .find(|rule| rule.matches(ctx))
            .map(CompiledRule::index)
    }

    /// Prune a top-level delta belonging to `resource_id`.
    pub fn prune_delta(
        &self,
        delta: Vec<PropertyChange>,
        resource_id: &str,
    ) -> Result<Vec<PropertyChange>> {
        let resource = ResourceDescriptor::parse(resource_id)?;
        let mut log = Vec::new();
        Ok(self.prune(delta, &resource, PathContext::root(), &mut log))
    }

    /// Prune sibling nodes under `parent`, preserving order.
    pub fn prune(
        &self,
        nodes: Vec<PropertyChange>,
        resource: &ResourceDescriptor,
        parent: PathContext<'_>,
        log: &mut Vec<Suppression>,
    ) -> Vec<PropertyChange> {
        nodes
            .into_iter()
            .filter_map(|node| self.prune_node(node, resource, parent, log))
            .collect()
    }

    fn prune_node(
        &self,
        mut node: PropertyChange,
        resource: &ResourceDescriptor,
        parent: PathContext<'_>,
        log: &mut Vec<Suppression>,
    ) -> Option<PropertyChange> {
        let full_path = parent.full_path(&node.path);
        let change_type = node.change_type();
        let ctx = MatchContext {
            resource,
            full_path: &full_path,
            change_type,
        };

        // A matched composite takes its whole subtree with it
        if let Some(index) = self.matching_rule(&ctx) {
            tracing::debug!(
                "{}: suppressed {} ({}) by rule #{}",
                resource.path_in_scope,
                full_path,
                change_type,
                index
            );
            log.push(Suppression {
                resource_id: resource.id.clone(),
                path: full_path,
                change_type,
                reason: SuppressionReason::Rule { index },
            });
            return None;
        }

        let (children, is_array) = match node.kind {
            DeltaKind::Leaf(_) => return Some(node),
            DeltaKind::Object(children) => (children, false),
            DeltaKind::Array(children) => (children, true),
        };

        let remaining = self.prune(
            children,
            resource,
            PathContext::children_of(&full_path, is_array),
            log,
        );
        if remaining.is_empty() {
            tracing::debug!(
                "{}: collapsed {} ({}) after all children were suppressed",
                resource.path_in_scope,
                full_path,
                change_type
            );
            log.push(Suppression {
                resource_id: resource.id.clone(),
                path: full_path,
                change_type,
                reason: SuppressionReason::Collapsed,
            });
            return None;
        }

        node.kind = if is_array {
            DeltaKind::Array(remaining)
        } else {
            DeltaKind::Object(remaining)
        };
        Some(node)
    }

    /// Denoise a result, leaving the caller's copy untouched.
    pub fn denoise(&self, result: &OperationResult) -> Result<DenoiseOutcome> {
        self.denoise_owned(result.clone())
    }

    /// Denoise a result the caller no longer needs.
    ///
    /// Changes are processed in parallel; output order matches input order.
    /// A malformed identifier on any `Modify` change fails the whole call.
    pub fn denoise_owned(&self, result: OperationResult) -> Result<DenoiseOutcome> {
        let OperationResult {
            status,
            changes,
            extra,
        } = result;

        let outcomes = changes
            .into_par_iter()
            .enumerate()
            .map(|(index, change)| {
                self.denoise_change(change)
                    .with_context(|| format!("denoising change #{index}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut changes = Vec::with_capacity(outcomes.len());
        let mut suppressed = Vec::new();
        let mut reclassified = Vec::new();
        for outcome in outcomes {
            if outcome.reclassified {
                reclassified.push(outcome.change.resource_id.clone());
            }
            suppressed.extend(outcome.suppressed);
            changes.push(outcome.change);
        }

        let outcome = DenoiseOutcome {
            result: OperationResult {
                status,
                changes,
                extra,
            },
            suppressed,
            reclassified,
        };
        tracing::debug!("Denoise finished: {}", outcome.summary());
        Ok(outcome)
    }

    fn denoise_change(&self, mut change: Change) -> Result<ChangeOutcome> {
        if change.change_type != ChangeType::Modify {
            return Ok(ChangeOutcome {
                change,
                suppressed: Vec::new(),
                reclassified: false,
            });
        }

        let resource = ResourceDescriptor::parse(&change.resource_id)?;
        let mut suppressed = Vec::new();
        let delta = self.prune(
            change.delta.take().unwrap_or_default(),
            &resource,
            PathContext::root(),
            &mut suppressed,
        );

        let reclassified = delta.is_empty();
        if reclassified {
            tracing::debug!("{}: no changes left, reclassified to NoChange", resource);
            change.change_type = ChangeType::NoChange;
        }
        change.delta = Some(delta);

        Ok(ChangeOutcome {
            change,
            suppressed,
            reclassified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyChangeType::{Array, Create, Delete, Modify, NoEffect};
    use serde_json::json;

    const ACCOUNT: &str =
        "/subscriptions/S/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acct1";

    fn engine(rules: Vec<Rule>) -> RuleEngine {
        RuleEngine::from_rules(rules).unwrap()
    }

    fn paths(nodes: &[PropertyChange]) -> Vec<&str> {
        nodes.iter().map(|n| n.path.as_str()).collect()
    }

    #[test]
    fn test_path_context() {
        assert_eq!(PathContext::root().full_path("sku"), "sku");
        assert_eq!(PathContext::children_of("a", false).full_path("b"), "a.b");
        assert_eq!(PathContext::children_of("items", true).full_path("0"), "items[]");
        assert_eq!(PathContext::children_of("", true).full_path("3"), "[]");
    }

    #[test]
    fn test_object_child_path_matches() {
        let delta = vec![PropertyChange::object(
            "a",
            vec![
                PropertyChange::leaf("b", Create),
                PropertyChange::leaf("c", Create),
            ],
        )];

        let pruned = engine(vec![Rule::default().property_path("a.b")])
            .prune_delta(delta, ACCOUNT)
            .unwrap();

        assert_eq!(paths(&pruned), vec!["a"]);
        assert_eq!(paths(pruned[0].children().unwrap()), vec!["c"]);
    }

    #[test]
    fn test_array_index_is_not_part_of_path() {
        let delta = || {
            vec![PropertyChange::array(
                "items",
                vec![PropertyChange::leaf("0", Create)],
            )]
        };

        let by_index = engine(vec![Rule::default().property_path("items[].0")])
            .prune_delta(delta(), ACCOUNT)
            .unwrap();
        assert_eq!(by_index, delta());

        let by_wildcard = engine(vec![Rule::default().property_path("items[]")])
            .prune_delta(delta(), ACCOUNT)
            .unwrap();
        assert!(by_wildcard.is_empty());
    }

    #[test]
    fn test_array_element_children_use_wildcard_prefix() {
        let delta = vec![PropertyChange::array(
            "path2",
            vec![
                PropertyChange::object("0", vec![PropertyChange::leaf("path2-0-1", Modify)]),
                PropertyChange::object("1", vec![PropertyChange::leaf("path2-1-1", Modify)]),
            ],
        )];

        let pruned = engine(vec![Rule::default().property_path("path2[].path2-0-1")])
            .prune_delta(delta, ACCOUNT)
            .unwrap();

        assert_eq!(paths(&pruned), vec!["path2"]);
        let elements = pruned[0].children().unwrap();
        assert_eq!(paths(elements), vec!["1"]);
        assert_eq!(paths(elements[0].children().unwrap()), vec!["path2-1-1"]);
    }

    #[test]
    fn test_matched_composite_drops_subtree() {
        let delta = vec![PropertyChange::object(
            "properties",
            vec![PropertyChange::leaf("tls", Delete)],
        )];
        let engine = engine(vec![Rule::default().property_change_type(Modify)]);

        let resource = ResourceDescriptor::parse(ACCOUNT).unwrap();
        let mut log = Vec::new();
        let pruned = engine.prune(delta, &resource, PathContext::root(), &mut log);

        assert!(pruned.is_empty());
        // Only the composite itself is logged; its children are never visited
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].path, "properties");
        assert_eq!(log[0].reason, SuppressionReason::Rule { index: 0 });
    }

    #[test]
    fn test_emptied_composite_collapses() {
        let delta = vec![
            PropertyChange::object("tags", vec![PropertyChange::leaf("owner", NoEffect)]),
            PropertyChange::leaf("sku", Modify),
        ];
        let engine = engine(vec![Rule::default().property_change_type(NoEffect)]);

        let resource = ResourceDescriptor::parse(ACCOUNT).unwrap();
        let mut log = Vec::new();
        let pruned = engine.prune(delta, &resource, PathContext::root(), &mut log);

        assert_eq!(paths(&pruned), vec!["sku"]);
        assert_eq!(
            log.iter().map(|s| (s.path.as_str(), s.reason)).collect::<Vec<_>>(),
            vec![
                ("tags.owner", SuppressionReason::Rule { index: 0 }),
                ("tags", SuppressionReason::Collapsed),
            ]
        );
    }

    #[test]
    fn test_change_type_predicate_uses_own_tag() {
        // The Create rule must not match the Array parent, only its element
        let delta = vec![PropertyChange::array(
            "rules",
            vec![
                PropertyChange::leaf("0", Create).with_after(json!("a")),
                PropertyChange::leaf("1", Delete).with_before(json!("b")),
            ],
        )];

        let pruned = engine(vec![Rule::default().property_change_type(Create)])
            .prune_delta(delta, ACCOUNT)
            .unwrap();

        assert_eq!(pruned[0].change_type(), Array);
        assert_eq!(paths(pruned[0].children().unwrap()), vec!["1"]);
    }

    #[test]
    fn test_surviving_nodes_are_unchanged() {
        let leaf = PropertyChange::leaf("sku", Modify)
            .with_before(json!("Standard"))
            .with_after(json!("Premium"));
        let pruned = engine(vec![Rule::default().property_path("tags")])
            .prune_delta(vec![leaf.clone()], ACCOUNT)
            .unwrap();
        assert_eq!(pruned, vec![leaf]);
    }

    #[test]
    fn test_denoise_reclassifies_emptied_modify() {
        let input = OperationResult::new(vec![
            Change::modify(ACCOUNT, vec![PropertyChange::leaf("sku", Create)]),
            Change::new(ACCOUNT, ChangeType::Create),
        ]);

        let outcome = engine(vec![Rule::default().property_change_type(Create)])
            .denoise(&input)
            .unwrap();

        assert_eq!(outcome.result.changes.len(), 2);
        assert_eq!(outcome.result.changes[0].change_type, ChangeType::NoChange);
        assert_eq!(outcome.result.changes[0].delta, Some(vec![]));
        assert_eq!(outcome.result.changes[1].change_type, ChangeType::Create);
        assert_eq!(outcome.reclassified, vec![ACCOUNT.to_string()]);
        assert_eq!(outcome.suppressed_by_rule(0), 1);
        // The caller's copy is untouched
        assert_eq!(input.changes[0].change_type, ChangeType::Modify);
    }

    #[test]
    fn test_resource_level_predicates_drop_whole_delta() {
        const OTHER: &str =
            "/subscriptions/S/resourceGroups/rg2/providers/Microsoft.Web/sites/app2";
        let delta = || {
            vec![
                PropertyChange::object(
                    "properties",
                    vec![PropertyChange::object(
                        "encryption",
                        vec![PropertyChange::leaf("keySource", Modify)],
                    )],
                ),
                PropertyChange::array(
                    "ipRules",
                    vec![
                        PropertyChange::leaf("0", Delete).with_before(json!("10.0.0.1")),
                        PropertyChange::leaf("1", Create).with_after(json!("10.0.0.2")),
                    ],
                ),
                PropertyChange::leaf("kind", NoEffect),
            ]
        };
        let input = OperationResult::new(vec![
            Change::modify(ACCOUNT, delta()),
            Change::modify(OTHER, delta()),
        ]);

        for rule in [
            Rule::default().resource_group_name("rg1"),
            Rule::default().provider_namespace("Microsoft.Storage"),
            Rule::default().resource_type("storageAccounts"),
            Rule::default().resource_name("acct1"),
        ] {
            let description = rule.description();
            let outcome = engine(vec![rule]).denoise(&input).unwrap();
            let changes = &outcome.result.changes;

            assert_eq!(changes[0].change_type, ChangeType::NoChange, "{description}");
            assert_eq!(changes[0].delta, Some(vec![]), "{description}");
            assert_eq!(changes[1].change_type, ChangeType::Modify, "{description}");
            assert_eq!(changes[1].delta, Some(delta()), "{description}");
            assert_eq!(outcome.reclassified, vec![ACCOUNT.to_string()]);
            // Top-level nodes match directly, so nothing below them is visited
            assert_eq!(outcome.suppressed_by_rule(0), 3, "{description}");
        }
    }

    #[test]
    fn test_denoise_non_matching_rule_is_noop() {
        let input = OperationResult::new(vec![Change::modify(
            ACCOUNT,
            vec![PropertyChange::leaf("sku", Create)],
        )]);

        let outcome = engine(vec![Rule::default().property_change_type(Delete)])
            .denoise(&input)
            .unwrap();

        assert_eq!(outcome.result, input);
        assert!(outcome.suppressed.is_empty());
    }

    #[test]
    fn test_denoise_skips_non_modify_changes() {
        let mut create = Change::new("not-an-azure-id", ChangeType::Create);
        create.after = Some(json!({"apiVersion": "2023-01-01"}));
        let input = OperationResult::new(vec![create]);

        let outcome = engine(vec![Rule::default()]).denoise(&input).unwrap();
        assert_eq!(outcome.result, input);
    }

    #[test]
    fn test_denoise_malformed_identifier_is_fatal() {
        let input = OperationResult::new(vec![
            Change::modify(ACCOUNT, vec![PropertyChange::leaf("sku", Create)]),
            Change::modify(
                "/subscriptions/S/providers/Microsoft.Storage/storageAccounts/a",
                vec![PropertyChange::leaf("sku", Create)],
            ),
        ]);

        let err = engine(vec![Rule::default().property_path("tags")])
            .denoise(&input)
            .unwrap_err();
        assert!(err.is_malformed_identifier());
        assert!(err.to_string().contains("change #1"));
    }

    #[test]
    fn test_denoise_summary() {
        let input = OperationResult::new(vec![Change::modify(
            ACCOUNT,
            vec![PropertyChange::object(
                "tags",
                vec![PropertyChange::leaf("a", Create), PropertyChange::leaf("b", Create)],
            )],
        )]);

        let summary = engine(vec![Rule::default().property_change_type(Create)])
            .denoise(&input)
            .unwrap()
            .summary();
        assert_eq!(
            summary,
            DenoiseSummary {
                changes: 1,
                nodes_suppressed: 2,
                nodes_collapsed: 1,
                reclassified: 1,
            }
        );
    }
}
