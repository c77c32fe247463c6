//! Denoise rule configuration.
//!
//! A rules file holds an ordered list of sparse rules:
//!
//! ```yaml
//! rules:
//!   - providerNamespace: Microsoft.Web
//!     resourceType: sites
//!     propertyPath: properties.siteConfig.localMySqlEnabled
//!   - resourceNameRegex: "^stg"
//!     propertyChangeType: NoEffect
//! ```
//!
//! Every predicate present in a rule must hold (AND); any matching rule
//! suppresses the node (OR).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::PropertyChangeType;

/// Root configuration: the ordered rule list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    pub rules: Vec<Rule>,
}

/// A conjunction of optional predicates. An absent predicate is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Rule {
    /// Exact resource group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,

    /// Exact provider namespace (e.g. `Microsoft.Storage`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_namespace: Option<String>,

    /// Exact resource type (e.g. `storageAccounts`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Exact resource name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,

    /// Regex searched in the resource name (unanchored). Rust `regex` syntax:
    /// lookaround and backreferences are not supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name_regex: Option<String>,

    /// Full property path, `.`-joined with `[]` for array elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_path: Option<String>,

    /// The node's own property change type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_change_type: Option<PropertyChangeType>,
}

impl Rule {
    pub fn resource_group_name(mut self, name: impl Into<String>) -> Self {
        self.resource_group_name = Some(name.into());
        self
    }

    pub fn provider_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.provider_namespace = Some(namespace.into());
        self
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    pub fn resource_name_regex(mut self, pattern: impl Into<String>) -> Self {
        self.resource_name_regex = Some(pattern.into());
        self
    }

    pub fn property_path(mut self, path: impl Into<String>) -> Self {
        self.property_path = Some(path.into());
        self
    }

    #[must_use]
    pub const fn property_change_type(mut self, change_type: PropertyChangeType) -> Self {
        self.property_change_type = Some(change_type);
        self
    }

    /// Number of predicates this rule defines
    #[must_use]
    pub fn predicate_count(&self) -> usize {
        [
            self.resource_group_name.is_some(),
            self.provider_namespace.is_some(),
            self.resource_type.is_some(),
            self.resource_name.is_some(),
            self.resource_name_regex.is_some(),
            self.property_path.is_some(),
            self.property_change_type.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// True if no predicate is defined (the rule would match every node)
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.predicate_count() == 0
    }

    /// Get a description of this rule for display
    #[must_use]
    pub fn description(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = &self.resource_group_name {
            parts.push(format!("resourceGroupName={v}"));
        }
        if let Some(v) = &self.provider_namespace {
            parts.push(format!("providerNamespace={v}"));
        }
        if let Some(v) = &self.resource_type {
            parts.push(format!("resourceType={v}"));
        }
        if let Some(v) = &self.resource_name {
            parts.push(format!("resourceName={v}"));
        }
        if let Some(v) = &self.resource_name_regex {
            parts.push(format!("resourceNameRegex=/{v}/"));
        }
        if let Some(v) = &self.property_path {
            parts.push(format!("propertyPath={v}"));
        }
        if let Some(v) = &self.property_change_type {
            parts.push(format!("propertyChangeType={v}"));
        }
        if parts.is_empty() {
            "<any>".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl RulesConfig {
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Load rules from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(yaml)
    }

    /// Load rules from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if the configuration is empty (no rules defined)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
