//! ARM subnet listing
//!
//! Used once at startup to build the subnet catalog from the subnets that
//! already exist in the database VNet.

use crate::credential::{ARM_SCOPE, TokenCredential};
use crate::error::{AzureError, Result};
use dispg_network::{SubnetCatalog, SubnetInfo};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

const ARM_ENDPOINT: &str = "https://management.azure.com";
const NETWORK_API_VERSION: &str = "2024-05-01";

/// Azure Resource Manager subnets client
pub struct SubnetsClient {
    client: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubnetListPage {
    #[serde(default)]
    value: Vec<ArmSubnet>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct ArmSubnet {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    properties: Option<ArmSubnetProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArmSubnetProperties {
    #[serde(default)]
    address_prefix: Option<String>,
}

#[derive(Deserialize)]
struct ArmErrorResponse {
    error: ArmError,
}

#[derive(Deserialize)]
struct ArmError {
    code: String,
    message: String,
}

impl SubnetsClient {
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self::with_endpoint(credential, ARM_ENDPOINT)
    }

    /// Client for a non-default ARM endpoint (sovereign clouds, tests)
    pub fn with_endpoint(credential: Arc<dyn TokenCredential>, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credential,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// List every subnet of a VNet, following `nextLink` paging.
    ///
    /// Subnets without an address prefix are skipped. Order is the order
    /// ARM returns them in.
    pub async fn list_subnets(
        &self,
        subscription_id: &str,
        resource_group: &str,
        vnet_name: &str,
    ) -> Result<Vec<SubnetInfo>> {
        let token = self.credential.get_token(ARM_SCOPE).await?;

        let mut url = Some(format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/virtualNetworks/{}/subnets?api-version={}",
            self.endpoint, subscription_id, resource_group, vnet_name, NETWORK_API_VERSION
        ));
        let mut subnets = Vec::new();

        while let Some(page_url) = url.take() {
            let response = self
                .client
                .get(&page_url)
                .bearer_auth(&token.token)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                let message = serde_json::from_str::<ArmErrorResponse>(&body)
                    .map(|e| format!("{}: {}", e.error.code, e.error.message))
                    .unwrap_or(body);
                return Err(AzureError::ApiError {
                    status: status.as_u16(),
                    message,
                });
            }

            let page: SubnetListPage = serde_json::from_str(&body)?;
            debug!(count = page.value.len(), "fetched subnet page");

            subnets.extend(page.value.into_iter().filter_map(|s| {
                let cidr = s.properties?.address_prefix?;
                Some(SubnetInfo::new(s.name.unwrap_or_default(), cidr))
            }));

            url = page.next_link.filter(|link| !link.is_empty());
        }

        info!(vnet = vnet_name, count = subnets.len(), "listed subnets");
        Ok(subnets)
    }

    /// List a VNet's subnets and build the catalog from them
    pub async fn fetch_subnet_catalog(
        &self,
        subscription_id: &str,
        resource_group: &str,
        vnet_name: &str,
    ) -> Result<SubnetCatalog> {
        let subnets = self
            .list_subnets(subscription_id, resource_group, vnet_name)
            .await?;
        Ok(SubnetCatalog::new(subnets)?)
    }
}
