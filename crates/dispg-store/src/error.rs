//! Object store error types

use thiserror::Error;

/// Object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// The write was rejected by the store's optimistic-concurrency check
    #[error("Conflict writing {0}")]
    Conflict(String),

    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[source] kube::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Classify a kube client error for the object named by `key`
    pub fn from_kube(err: kube::Error, key: impl Into<String>) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound(key.into()),
            kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
                StoreError::AlreadyExists(key.into())
            }
            kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict(key.into()),
            other => StoreError::Kube(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
