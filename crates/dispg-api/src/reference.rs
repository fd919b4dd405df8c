//! Resource references as understood by Azure Service Operator

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to an owner, either by Kubernetes name or by ARM ID
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KnownResourceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_id: Option<String>,
}

impl KnownResourceReference {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            arm_id: None,
        }
    }

    pub fn by_arm_id(arm_id: impl Into<String>) -> Self {
        Self {
            name: None,
            arm_id: Some(arm_id.into()),
        }
    }
}

/// Reference to an arbitrary resource, by group/kind/name or by ARM ID
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_id: Option<String>,
}

impl ResourceReference {
    pub fn by_arm_id(arm_id: impl Into<String>) -> Self {
        Self {
            arm_id: Some(arm_id.into()),
            ..Default::default()
        }
    }

    pub fn by_kind(group: &str, kind: &str, name: impl Into<String>) -> Self {
        Self {
            group: Some(group.to_string()),
            kind: Some(kind.to_string()),
            name: Some(name.into()),
            arm_id: None,
        }
    }
}
