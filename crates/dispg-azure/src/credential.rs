//! Workload identity credential
//!
//! Exchanges the projected service-account token for an Entra access token
//! (client credentials grant with a federated client assertion). The webhook
//! that injects workload identity provides the four `AZURE_*` variables read
//! by [`WorkloadIdentityConfig::from_env`].

use crate::error::{AzureError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Scope for Azure Resource Manager
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Scope for Entra authentication against Azure Database for PostgreSQL
pub const POSTGRES_SCOPE: &str = "https://ossrdbms-aad.database.windows.net/.default";

/// Source of bearer tokens
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Obtain an access token for `scope`
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// A bearer token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone)]
pub struct WorkloadIdentityConfig {
    pub client_id: String,
    pub tenant_id: String,
    pub token_file: PathBuf,
    pub authority_host: String,
}

impl WorkloadIdentityConfig {
    /// Read the workload identity environment injected into the pod
    pub fn from_env() -> Result<Self> {
        let client_id = required_env("AZURE_CLIENT_ID")?;
        let tenant_id = required_env("AZURE_TENANT_ID")?;
        let token_file = PathBuf::from(required_env("AZURE_FEDERATED_TOKEN_FILE")?);
        let authority_host = std::env::var("AZURE_AUTHORITY_HOST")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());

        Ok(Self {
            client_id,
            tenant_id,
            token_file,
            authority_host,
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AzureError::MissingEnvVar(key.to_string()))
}

/// [`TokenCredential`] using Azure workload identity federation
pub struct WorkloadIdentityCredential {
    client: reqwest::Client,
    config: WorkloadIdentityConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl WorkloadIdentityCredential {
    pub fn new(config: WorkloadIdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(WorkloadIdentityConfig::from_env()?))
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.config.authority_host.trim_end_matches('/'),
            self.config.tenant_id
        )
    }
}

#[async_trait]
impl TokenCredential for WorkloadIdentityCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        // The projected token is rotated by the kubelet, so read it per request.
        let assertion = tokio::fs::read_to_string(&self.config.token_file).await?;

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_assertion_type", CLIENT_ASSERTION_TYPE),
            ("client_assertion", assertion.trim()),
            ("scope", scope),
        ];

        debug!(scope, tenant = %self.config.tenant_id, "requesting access token");

        let response = self
            .client
            .post(self.token_url())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(AzureError::AuthenticationFailed(message));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(AccessToken {
            token: token.access_token,
            expires_in: token.expires_in,
        })
    }
}
