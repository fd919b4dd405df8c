//! `ApplicationIdentity` custom resource
//!
//! Owned and reconciled by the identity operator. Only the status fields the
//! database operator consumes are modelled; its `spec` is kept opaque.

use crate::condition::{Condition, find_condition};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "application.dis.altinn.cloud",
    version = "v1alpha1",
    kind = "ApplicationIdentity",
    plural = "applicationidentities",
    namespaced,
    status = "ApplicationIdentityStatus"
)]
pub struct ApplicationIdentitySpec {
    #[serde(flatten)]
    #[schemars(skip)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationIdentityStatus {
    /// Entra object ID of the managed identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Name of the managed identity in Azure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_identity_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl ApplicationIdentity {
    /// Value of the "Ready" condition, `None` when it is absent
    pub fn ready(&self) -> Option<bool> {
        self.status
            .as_ref()
            .and_then(|s| find_condition(&s.conditions, "Ready"))
            .map(Condition::is_true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_and_ready() {
        let identity: ApplicationIdentity = serde_json::from_value(serde_json::json!({
            "apiVersion": "application.dis.altinn.cloud/v1alpha1",
            "kind": "ApplicationIdentity",
            "metadata": {"name": "orders-admin", "namespace": "team-a"},
            "spec": {"azureAudiences": ["api://AzureADTokenExchange"]},
            "status": {
                "principalId": "pid",
                "clientId": "cid",
                "managedIdentityName": "mi-orders-admin",
                "conditions": [{"type": "Ready", "status": "True"}]
            }
        }))
        .unwrap();

        let status = identity.status.as_ref().unwrap();
        assert_eq!(status.managed_identity_name.as_deref(), Some("mi-orders-admin"));
        assert_eq!(identity.ready(), Some(true));
        assert!(identity.spec.fields.contains_key("azureAudiences"));
    }

    #[test]
    fn test_ready_absent_without_conditions() {
        let identity = ApplicationIdentity::new("x", ApplicationIdentitySpec::default());
        assert_eq!(identity.ready(), None);
    }
}
