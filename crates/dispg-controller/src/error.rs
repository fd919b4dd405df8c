//! Reconciliation error types

use dispg_config::ConfigError;
use dispg_network::SubnetError;
use dispg_store::StoreError;
use thiserror::Error;

/// Errors that abort a reconciliation tick
///
/// "Not ready yet" is deliberately absent: it is the
/// [`Resolution::NotReady`](crate::identity::Resolution) value, not an error.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The Database spec is malformed; retrying will not help until it is edited
    #[error("Invalid Database spec: {0}")]
    Validation(String),

    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    #[error("Subnet allocation failed: {0}")]
    Subnet(#[from] SubnetError),

    #[error("Operator misconfigured: {0}")]
    Config(#[from] ConfigError),
}

impl ReconcileError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ReconcileError::Validation(msg.into())
    }

    /// Whether retrying without a spec change can succeed
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReconcileError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
