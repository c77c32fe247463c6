//! What-if operation result document.
//!
//! Mirrors the `WhatIfOperationResult` returned by
//! `az deployment group what-if --no-pretty-print`. Fields the engine does
//! not interpret are kept in `extra` so the document round-trips.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ParseErrorKind, Result};

/// Resource-level change classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    Create,
    Delete,
    Deploy,
    Ignore,
    Modify,
    NoChange,
}

impl ChangeType {
    /// Changes that would alter deployed state.
    #[must_use]
    pub const fn is_actionable(self) -> bool {
        matches!(
            self,
            Self::Create | Self::Delete | Self::Deploy | Self::Modify
        )
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Deploy => "Deploy",
            Self::Ignore => "Ignore",
            Self::Modify => "Modify",
            Self::NoChange => "NoChange",
        };
        f.write_str(name)
    }
}

/// Property-level change classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PropertyChangeType {
    Array,
    Create,
    Delete,
    Modify,
    NoEffect,
}

impl fmt::Display for PropertyChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Array => "Array",
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Modify => "Modify",
            Self::NoEffect => "NoEffect",
        };
        f.write_str(name)
    }
}

/// Shape of a delta node.
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaKind {
    /// A value change without nested deltas. `Leaf(Array)` is an array
    /// change whose children were not reported.
    Leaf(PropertyChangeType),
    /// Nested object diff (`Modify` with children)
    Object(Vec<PropertyChange>),
    /// Nested array diff; each child's `path` is its index
    Array(Vec<PropertyChange>),
}

/// One node of a resource's delta tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPropertyChange", into = "RawPropertyChange")]
pub struct PropertyChange {
    /// Local path: a property name, or an index under an array node
    pub path: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub kind: DeltaKind,
}

impl PropertyChange {
    /// Create a leaf node.
    pub fn leaf(path: impl Into<String>, change_type: PropertyChangeType) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: None,
            kind: DeltaKind::Leaf(change_type),
        }
    }

    /// Create a nested object diff node.
    pub fn object(path: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: None,
            kind: DeltaKind::Object(children),
        }
    }

    /// Create a nested array diff node.
    pub fn array(path: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: None,
            kind: DeltaKind::Array(children),
        }
    }

    #[must_use]
    pub fn with_before(mut self, value: Value) -> Self {
        self.before = Some(value);
        self
    }

    #[must_use]
    pub fn with_after(mut self, value: Value) -> Self {
        self.after = Some(value);
        self
    }

    /// The node's own change-type tag.
    #[must_use]
    pub const fn change_type(&self) -> PropertyChangeType {
        match self.kind {
            DeltaKind::Leaf(change_type) => change_type,
            DeltaKind::Object(_) => PropertyChangeType::Modify,
            DeltaKind::Array(_) => PropertyChangeType::Array,
        }
    }

    /// Nested deltas, if this node is composite.
    #[must_use]
    pub fn children(&self) -> Option<&[Self]> {
        match &self.kind {
            DeltaKind::Leaf(_) => None,
            DeltaKind::Object(children) | DeltaKind::Array(children) => Some(children),
        }
    }
}

/// Wire form of [`PropertyChange`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPropertyChange {
    path: String,
    property_change_type: PropertyChangeType,
    #[serde(default)]
    before: Option<Value>,
    #[serde(default)]
    after: Option<Value>,
    #[serde(default)]
    children: Option<Vec<PropertyChange>>,
}

impl TryFrom<RawPropertyChange> for PropertyChange {
    type Error = ParseErrorKind;

    fn try_from(raw: RawPropertyChange) -> std::result::Result<Self, Self::Error> {
        let kind = match (raw.property_change_type, raw.children) {
            (change_type, None) => DeltaKind::Leaf(change_type),
            (PropertyChangeType::Modify, Some(children)) => DeltaKind::Object(children),
            (PropertyChangeType::Array, Some(children)) => DeltaKind::Array(children),
            (change_type, Some(_)) => {
                return Err(ParseErrorKind::InvalidDelta {
                    path: raw.path,
                    reason: format!("{change_type} changes cannot have children"),
                });
            }
        };
        Ok(Self {
            path: raw.path,
            before: raw.before,
            after: raw.after,
            kind,
        })
    }
}

impl From<PropertyChange> for RawPropertyChange {
    fn from(change: PropertyChange) -> Self {
        let property_change_type = change.change_type();
        let children = match change.kind {
            DeltaKind::Leaf(_) => None,
            DeltaKind::Object(children) | DeltaKind::Array(children) => Some(children),
        };
        Self {
            path: change.path,
            property_change_type,
            before: change.before,
            after: change.after,
            children,
        }
    }
}

/// The before/after diff for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub resource_id: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub before: Option<Value>,
    #[serde(default)]
    pub after: Option<Value>,
    /// Property deltas; meaningful only for `Modify`
    #[serde(default)]
    pub delta: Option<Vec<PropertyChange>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Change {
    /// Create a change without before/after snapshots.
    pub fn new(resource_id: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            resource_id: resource_id.into(),
            change_type,
            before: None,
            after: None,
            delta: None,
            extra: Map::new(),
        }
    }

    /// Create a `Modify` change carrying the given delta.
    pub fn modify(resource_id: impl Into<String>, delta: Vec<PropertyChange>) -> Self {
        Self {
            delta: Some(delta),
            ..Self::new(resource_id, ChangeType::Modify)
        }
    }

    /// `apiVersion` recorded in the after (or before) snapshot.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .and_then(|snapshot| snapshot.get("apiVersion"))
            .and_then(Value::as_str)
    }
}

/// A full what-if dry-run result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub status: String,
    pub changes: Vec<Change>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperationResult {
    /// Create a result with the given changes and `Succeeded` status.
    #[must_use]
    pub fn new(changes: Vec<Change>) -> Self {
        Self {
            status: "Succeeded".to_string(),
            changes,
            extra: Map::new(),
        }
    }

    /// Deserialize a what-if document.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether any change would still alter deployed state.
    #[must_use]
    pub fn has_actionable_changes(&self) -> bool {
        self.changes.iter().any(|c| c.change_type.is_actionable())
    }

    /// Number of changes with the given classification.
    #[must_use]
    pub fn count(&self, change_type: ChangeType) -> usize {
        self.changes
            .iter()
            .filter(|c| c.change_type == change_type)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_nested_delta() {
        let doc = json!({
            "status": "Succeeded",
            "changes": [{
                "resourceId": "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Web/sites/app",
                "changeType": "Modify",
                "before": {"apiVersion": "2022-03-01"},
                "after": {"apiVersion": "2022-03-01"},
                "delta": [{
                    "path": "properties",
                    "propertyChangeType": "Modify",
                    "before": null,
                    "after": null,
                    "children": [{
                        "path": "ipRules",
                        "propertyChangeType": "Array",
                        "before": null,
                        "after": null,
                        "children": [{
                            "path": "0",
                            "propertyChangeType": "Create",
                            "before": null,
                            "after": "10.0.0.0/8",
                            "children": null
                        }]
                    }]
                }]
            }]
        });

        let result: OperationResult = serde_json::from_value(doc).unwrap();
        let delta = result.changes[0].delta.as_ref().unwrap();
        assert_eq!(delta[0].change_type(), PropertyChangeType::Modify);

        let ip_rules = &delta[0].children().unwrap()[0];
        assert!(matches!(ip_rules.kind, DeltaKind::Array(_)));
        let element = &ip_rules.children().unwrap()[0];
        assert_eq!(element.kind, DeltaKind::Leaf(PropertyChangeType::Create));
        assert_eq!(element.after, Some(json!("10.0.0.0/8")));
        assert_eq!(result.changes[0].api_version(), Some("2022-03-01"));
    }

    #[test]
    fn test_modify_without_children_is_leaf() {
        let node: PropertyChange = serde_json::from_value(json!({
            "path": "sku",
            "propertyChangeType": "Modify",
            "before": "Standard",
            "after": "Premium"
        }))
        .unwrap();
        assert_eq!(node.kind, DeltaKind::Leaf(PropertyChangeType::Modify));
        assert!(node.children().is_none());
    }

    #[test]
    fn test_children_on_create_rejected() {
        let err = serde_json::from_value::<PropertyChange>(json!({
            "path": "tags",
            "propertyChangeType": "Create",
            "children": []
        }))
        .unwrap_err();
        assert!(err.to_string().contains("cannot have children"));
    }

    #[test]
    fn test_serialize_keeps_wire_shape() {
        let node = PropertyChange::array(
            "items",
            vec![PropertyChange::leaf("0", PropertyChangeType::Delete).with_before(json!(1))],
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "path": "items",
                "propertyChangeType": "Array",
                "before": null,
                "after": null,
                "children": [{
                    "path": "0",
                    "propertyChangeType": "Delete",
                    "before": 1,
                    "after": null,
                    "children": null
                }]
            })
        );
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let doc = json!({
            "status": "Succeeded",
            "error": null,
            "changes": [{
                "resourceId": "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/a",
                "changeType": "Ignore",
                "unsupportedReason": null,
                "before": null,
                "after": null,
                "delta": null
            }]
        });
        let result: OperationResult = serde_json::from_value(doc).unwrap();
        assert!(result.extra.contains_key("error"));
        assert!(result.changes[0].extra.contains_key("unsupportedReason"));

        let back = serde_json::to_value(&result).unwrap();
        assert!(back["changes"][0].get("unsupportedReason").is_some());
    }

    #[test]
    fn test_actionable_changes() {
        let quiet = OperationResult::new(vec![
            Change::new("a", ChangeType::NoChange),
            Change::new("b", ChangeType::Ignore),
        ]);
        assert!(!quiet.has_actionable_changes());

        let noisy = OperationResult::new(vec![Change::new("a", ChangeType::Deploy)]);
        assert!(noisy.has_actionable_changes());
        assert_eq!(noisy.count(ChangeType::Deploy), 1);
    }
}
