//! Operator settings shared by every reconciliation

use crate::error::{ConfigError, Result};
use serde::Deserialize;

pub const DEFAULT_LOCATION: &str = "norwayeast";

/// Environment-wide settings, built once at startup from already-parsed flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// Namespace the operator is allowed to write into
    pub write_namespace: String,

    /// Resource group owning the database VNet and the private DNS zones
    pub resource_group: String,

    /// Resource group of the consumer (AKS) VNet; defaults to `resource_group`
    pub aks_resource_group: String,

    pub db_vnet_name: String,
    pub aks_vnet_name: String,
    pub subscription_id: String,
    pub tenant_id: String,

    /// Azure region for servers; defaults to norwayeast
    pub location: String,

    /// Image run by the user provisioning job
    pub user_provision_image: String,

    /// Run against in-cluster fakes: no Entra auth, plain PostgreSQL
    pub use_az_fakes: bool,
}

impl OperatorConfig {
    /// Validate required settings and fill in defaults
    pub fn validate(mut self) -> Result<Self> {
        if self.write_namespace.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "write namespace",
                flag: "write-namespace",
            });
        }
        if self.resource_group.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "resource group",
                flag: "resource-group",
            });
        }

        if self.aks_resource_group.trim().is_empty() {
            self.aks_resource_group = self.resource_group.clone();
        }
        if self.location.trim().is_empty() {
            self.location = DEFAULT_LOCATION.to_string();
        }

        Ok(self)
    }

    /// Tenant ID, required before Entra settings can be written
    pub fn require_tenant_id(&self) -> Result<&str> {
        non_empty(&self.tenant_id, "tenant ID", "tenant-id")
    }

    /// Provisioning image, required before a provisioning job can be built
    pub fn require_user_provision_image(&self) -> Result<&str> {
        non_empty(&self.user_provision_image, "user provision image", "user-provision-image")
    }

    /// `/subscriptions/{sub}/resourceGroups/{rg}`
    pub fn resource_group_arm_id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group
        )
    }

    /// ARM ID of the database VNet
    pub fn db_vnet_arm_id(&self) -> Result<String> {
        let vnet = non_empty(&self.db_vnet_name, "database VNet name", "db-vnet-name")?;
        Ok(vnet_arm_id(&self.subscription_id, &self.resource_group, vnet))
    }

    /// ARM ID of the consumer (AKS) VNet
    pub fn aks_vnet_arm_id(&self) -> Result<String> {
        let vnet = non_empty(&self.aks_vnet_name, "AKS VNet name", "aks-vnet-name")?;
        Ok(vnet_arm_id(&self.subscription_id, &self.aks_resource_group, vnet))
    }

    /// ARM ID of a subnet in the database VNet
    pub fn subnet_arm_id(&self, subnet_name: &str) -> Result<String> {
        Ok(format!("{}/subnets/{}", self.db_vnet_arm_id()?, subnet_name))
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str, flag: &'static str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(ConfigError::Missing { field, flag })
    } else {
        Ok(value)
    }
}

fn vnet_arm_id(subscription_id: &str, resource_group: &str, vnet: &str) -> String {
    format!(
        "/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/Microsoft.Network/virtualNetworks/{vnet}"
    )
}
