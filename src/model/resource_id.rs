//! Azure resource identifier parsing.
//!
//! Resource-level rule predicates (resource group, provider namespace, type,
//! name) are evaluated against a [`ResourceDescriptor`] decomposed from the
//! change's `resourceId`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{DenoiseError, Result};

/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name...}`
static RESOURCE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/subscriptions/([^/]+)/resourceGroups/([^/]+)/providers/([^/]+)/([^/]+)/(.+)$")
        .expect("static regex")
});

/// Deployment scope a resource lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceScope {
    ResourceGroup,
}

/// Resource group a resource belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupRef {
    /// `/subscriptions/{sub}/resourceGroups/{rg}`
    pub id: String,
    pub name: String,
}

/// Structured view of a resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// The identifier this descriptor was parsed from
    pub id: String,
    pub scope: ResourceScope,
    pub subscription_id: String,
    pub resource_group: ResourceGroupRef,
    pub provider_namespace: String,
    /// First type segment after the provider namespace
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Everything after the type segment, including nested child
    /// `type/name` segments, verbatim
    pub name: String,
    /// `{providerNamespace}/{type}/{name}`
    pub path_in_scope: String,
}

impl ResourceDescriptor {
    /// Parse a resource-group scoped identifier.
    ///
    /// Fails with `MalformedIdentifier` when the identifier does not match
    /// the `/subscriptions/../resourceGroups/../providers/..` shape.
    pub fn parse(id: &str) -> Result<Self> {
        let caps = RESOURCE_ID_PATTERN
            .captures(id)
            .ok_or_else(|| DenoiseError::malformed_identifier(id))?;

        let subscription_id = &caps[1];
        let group_name = &caps[2];
        let provider_namespace = &caps[3];
        let resource_type = &caps[4];
        let name = &caps[5];

        Ok(Self {
            id: id.to_string(),
            scope: ResourceScope::ResourceGroup,
            subscription_id: subscription_id.to_string(),
            resource_group: ResourceGroupRef {
                id: format!("/subscriptions/{subscription_id}/resourceGroups/{group_name}"),
                name: group_name.to_string(),
            },
            provider_namespace: provider_namespace.to_string(),
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            path_in_scope: format!("{provider_namespace}/{resource_type}/{name}"),
        })
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_in_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/test-resource-group/providers/Microsoft.ManagedIdentity/userAssignedIdentities/myIdentity";

    #[test]
    fn test_parse_valid_identifier() {
        let descriptor = ResourceDescriptor::parse(IDENTITY_ID).unwrap();

        assert_eq!(descriptor.id, IDENTITY_ID);
        assert_eq!(descriptor.scope, ResourceScope::ResourceGroup);
        assert_eq!(
            descriptor.subscription_id,
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            descriptor.resource_group.id,
            "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/test-resource-group"
        );
        assert_eq!(descriptor.resource_group.name, "test-resource-group");
        assert_eq!(descriptor.provider_namespace, "Microsoft.ManagedIdentity");
        assert_eq!(descriptor.resource_type, "userAssignedIdentities");
        assert_eq!(descriptor.name, "myIdentity");
        assert_eq!(
            descriptor.path_in_scope,
            "Microsoft.ManagedIdentity/userAssignedIdentities/myIdentity"
        );
    }

    #[test]
    fn test_parse_nested_child_resource_keeps_tail_verbatim() {
        let id = "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Sql/servers/srv1/databases/db1";
        let descriptor = ResourceDescriptor::parse(id).unwrap();

        assert_eq!(descriptor.resource_type, "servers");
        assert_eq!(descriptor.name, "srv1/databases/db1");
        assert_eq!(
            descriptor.path_in_scope,
            "Microsoft.Sql/servers/srv1/databases/db1"
        );
    }

    #[test]
    fn test_parse_missing_resource_groups_segment() {
        let err = ResourceDescriptor::parse(
            "/subscriptions/00000000-0000-0000-0000-000000000001/test-resource-group/providers/Microsoft.ManagedIdentity/userAssignedIdentities/myIdentity",
        )
        .unwrap_err();
        assert!(err.is_malformed_identifier());
    }

    #[test]
    fn test_parse_rejects_identifier_without_name() {
        assert!(ResourceDescriptor::parse(
            "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts"
        )
        .is_err());
        assert!(ResourceDescriptor::parse("").is_err());
    }

    #[test]
    fn test_display_is_path_in_scope() {
        let descriptor = ResourceDescriptor::parse(IDENTITY_ID).unwrap();
        assert_eq!(
            descriptor.to_string(),
            "Microsoft.ManagedIdentity/userAssignedIdentities/myIdentity"
        );
    }
}
