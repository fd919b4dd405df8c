//! Private DNS resources (`network.azure.com`)

use crate::reference::{KnownResourceReference, ResourceReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "network.azure.com",
    version = "v1api20240601",
    kind = "PrivateDnsZone",
    plural = "privatednszones",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDnsZoneSpec {
    pub azure_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<KnownResourceReference>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "network.azure.com",
    version = "v1api20240601",
    kind = "PrivateDnsZonesVirtualNetworkLink",
    plural = "privatednszonesvirtualnetworklinks",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDnsZonesVirtualNetworkLinkSpec {
    pub azure_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// The owning zone, by Kubernetes name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<KnownResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network: Option<SubResource>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct SubResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ResourceReference>,
}
