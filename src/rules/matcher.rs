//! Rule matcher.
//!
//! A [`Rule`] compiles into a list of named predicates over a common
//! [`MatchContext`]. The rule matches when every predicate holds; a rule
//! with no predicates matches everything.

use regex::Regex;
use std::fmt;

use super::config::Rule;
use crate::error::{DenoiseError, Result};
use crate::model::{PropertyChangeType, ResourceDescriptor};

/// Everything a predicate may inspect about one delta node.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// Descriptor of the resource owning the node
    pub resource: &'a ResourceDescriptor,
    /// The node's full path (see `PathContext`)
    pub full_path: &'a str,
    /// The node's own change type
    pub change_type: PropertyChangeType,
}

type PredicateFn = Box<dyn Fn(&MatchContext<'_>) -> bool + Send + Sync>;

/// One named condition of a compiled rule
pub struct Predicate {
    name: &'static str,
    test: PredicateFn,
}

impl Predicate {
    fn new(
        name: &'static str,
        test: impl Fn(&MatchContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            test: Box::new(test),
        }
    }

    /// Predicate name, matching the rule key it came from
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn holds(&self, ctx: &MatchContext<'_>) -> bool {
        (self.test)(ctx)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").field("name", &self.name).finish()
    }
}

/// A rule with its regex pre-compiled and predicates materialized.
#[derive(Debug)]
pub struct CompiledRule {
    index: usize,
    rule: Rule,
    predicates: Vec<Predicate>,
}

impl CompiledRule {
    /// Compile the rule at position `index` of the configuration.
    ///
    /// Fails with `InvalidRegex` if `resourceNameRegex` does not compile.
    pub fn compile(index: usize, rule: &Rule) -> Result<Self> {
        let mut predicates = Vec::with_capacity(rule.predicate_count());

        if let Some(expected) = rule.resource_group_name.clone() {
            predicates.push(Predicate::new("resourceGroupName", move |ctx| {
                ctx.resource.resource_group.name == expected
            }));
        }
        if let Some(expected) = rule.provider_namespace.clone() {
            predicates.push(Predicate::new("providerNamespace", move |ctx| {
                ctx.resource.provider_namespace == expected
            }));
        }
        if let Some(expected) = rule.resource_type.clone() {
            predicates.push(Predicate::new("resourceType", move |ctx| {
                ctx.resource.resource_type == expected
            }));
        }
        if let Some(expected) = rule.resource_name.clone() {
            predicates.push(Predicate::new("resourceName", move |ctx| {
                ctx.resource.name == expected
            }));
        }
        if let Some(pattern) = &rule.resource_name_regex {
            let re = Regex::new(pattern)
                .map_err(|e| DenoiseError::invalid_regex(index, pattern.as_str(), e.to_string()))?;
            predicates.push(Predicate::new("resourceNameRegex", move |ctx| {
                re.is_match(&ctx.resource.name)
            }));
        }
        if let Some(expected) = rule.property_path.clone() {
            predicates.push(Predicate::new("propertyPath", move |ctx| {
                ctx.full_path == expected
            }));
        }
        if let Some(expected) = rule.property_change_type {
            predicates.push(Predicate::new("propertyChangeType", move |ctx| {
                ctx.change_type == expected
            }));
        }

        Ok(Self {
            index,
            rule: rule.clone(),
            predicates,
        })
    }

    /// True if every predicate holds for the context.
    #[must_use]
    pub fn matches(&self, ctx: &MatchContext<'_>) -> bool {
        self.predicates.iter().all(|p| p.holds(ctx))
    }

    /// Name of the first predicate that rejects the context, if any.
    #[must_use]
    pub fn first_failing(&self, ctx: &MatchContext<'_>) -> Option<&'static str> {
        self.predicates
            .iter()
            .find(|p| !p.holds(ctx))
            .map(Predicate::name)
    }

    /// Position of this rule in the configuration
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn rule(&self) -> &Rule {
        &self.rule
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}

/// Evaluate a single rule against one node without pre-compilation.
pub fn rule_matches(rule: &Rule, ctx: &MatchContext<'_>) -> Result<bool> {
    Ok(CompiledRule::compile(0, rule)?.matches(ctx))
}
