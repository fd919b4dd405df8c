//! PostgreSQL Flexible Server resources (`dbforpostgresql.azure.com`)

use crate::reference::{KnownResourceReference, ResourceReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "dbforpostgresql.azure.com",
    version = "v20250801",
    kind = "FlexibleServer",
    plural = "flexibleservers",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleServerSpec {
    pub azure_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<KnownResourceReference>,

    /// Major version, e.g. "17"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<ServerNetwork>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<Backup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_config: Option<AuthConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegated_subnet_resource_reference: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_dns_zone_arm_resource_reference: Option<ResourceReference>,

    /// "Enabled" or "Disabled"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    /// "Enabled" or "Disabled"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_grow: Option<String>,

    #[serde(rename = "storageSizeGB", default, skip_serializing_if = "Option::is_none")]
    pub storage_size_gb: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct Sku {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// "Burstable", "GeneralPurpose" or "MemoryOptimized"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_retention_days: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_directory_auth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_auth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Entra administrator of a server. `azureName` is the principal object ID.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "dbforpostgresql.azure.com",
    version = "v20250801",
    kind = "FlexibleServersAdministrator",
    plural = "flexibleserversadministrators",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleServersAdministratorSpec {
    pub azure_name: String,

    /// The server, by Kubernetes name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<KnownResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,

    /// "User", "Group" or "ServicePrincipal"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// A server parameter. `azureName` is the parameter name.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "dbforpostgresql.azure.com",
    version = "v20250801",
    kind = "FlexibleServersConfiguration",
    plural = "flexibleserversconfigurations",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleServersConfigurationSpec {
    pub azure_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<KnownResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
