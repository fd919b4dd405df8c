//! Provisioning error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("{0} must be set")]
    MissingEnvVar(&'static str),

    #[error("principal id is required for Entra user provisioning")]
    MissingPrincipalId,

    #[error("Failed to get Entra token: {0}")]
    Token(#[from] dispg_azure::AzureError),

    #[error("Failed to connect to PostgreSQL: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to {step}: {source}")]
    Sql {
        step: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
