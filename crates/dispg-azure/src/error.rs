//! Azure client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Token request failed: {0}")]
    AuthenticationFailed(String),

    #[error("Azure API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Subnet catalog error: {0}")]
    Subnet(#[from] dispg_network::SubnetError),
}

pub type Result<T> = std::result::Result<T, AzureError>;
