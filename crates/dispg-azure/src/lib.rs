//! Azure REST plumbing for dispg
//!
//! The operator itself never calls ARM for the resources it manages; those
//! are written as Azure Service Operator objects. This crate only covers the
//! two direct calls that remain:
//!
//! - exchanging the workload identity token for Entra access tokens
//! - listing the database VNet's subnets to seed the subnet catalog

pub mod credential;
pub mod error;
pub mod subnets;

pub use credential::{
    ARM_SCOPE, AccessToken, POSTGRES_SCOPE, TokenCredential, WorkloadIdentityConfig,
    WorkloadIdentityCredential,
};
pub use error::{AzureError, Result};
pub use subnets::SubnetsClient;
