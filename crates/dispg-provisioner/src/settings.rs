//! Environment contract of the provisioning job

use crate::error::{ProvisionError, Result};

pub const AZURE_POSTGRES_SUFFIX: &str = "postgres.database.azure.com";
pub const FAKE_POSTGRES_HOST: &str = "postgres.default.svc";
pub const POSTGRES_PORT: u16 = 5432;

/// Everything the provisioning job needs, read from `DISPG_*` variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Server (and default schema) name
    pub database_name: String,
    pub user_identity: String,
    pub user_principal_id: String,
    pub admin_identity: String,
    pub schema: String,
    /// Plain PostgreSQL with password auth instead of Entra
    pub disable_aad: bool,
    pub host: String,
    /// Database to connect to and grant CONNECT on
    pub db_name: String,
    pub ssl_mode: String,
    /// Login role when Entra auth is disabled
    pub admin_user: String,
    pub password: String,
}

impl ProvisionSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any variable source; values are trimmed and empty
    /// values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| var(key).ok_or(ProvisionError::MissingEnvVar(key));

        let disable_aad = var("DISPG_DISABLE_AAD").is_some_and(|v| parse_bool(&v));

        let database_name = required("DISPG_DATABASE_NAME")?;
        let user_identity = required("DISPG_USER_APP_IDENTITY")?;
        let (user_principal_id, admin_identity) = if disable_aad {
            (
                var("DISPG_USER_APP_PRINCIPAL_ID").unwrap_or_default(),
                var("DISPG_ADMIN_APP_IDENTITY").unwrap_or_default(),
            )
        } else {
            (
                required("DISPG_USER_APP_PRINCIPAL_ID")?,
                required("DISPG_ADMIN_APP_IDENTITY")?,
            )
        };

        let schema = var("DISPG_DB_SCHEMA").unwrap_or_else(|| database_name.clone());
        let host = var("DISPG_DB_HOST").unwrap_or_else(|| {
            if disable_aad {
                FAKE_POSTGRES_HOST.to_string()
            } else {
                format!("{database_name}.{AZURE_POSTGRES_SUFFIX}")
            }
        });
        let ssl_mode = var("DISPG_DB_SSLMODE").unwrap_or_else(|| {
            if disable_aad { "disable" } else { "require" }.to_string()
        });

        Ok(Self {
            database_name,
            user_identity,
            user_principal_id,
            admin_identity,
            schema,
            disable_aad,
            host,
            db_name: var("DISPG_DB_NAME").unwrap_or_else(|| "postgres".to_string()),
            ssl_mode,
            admin_user: var("DISPG_DB_ADMIN_USER").unwrap_or_else(|| "postgres".to_string()),
            password: var("DISPG_DB_PASSWORD").unwrap_or_default(),
        })
    }

    /// Role the job logs in as
    pub fn login_user(&self) -> &str {
        if self.disable_aad {
            &self.admin_user
        } else {
            &self.admin_identity
        }
    }
}

/// `1`, `true`, `yes`, `y` or `on`, case-insensitive
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}
