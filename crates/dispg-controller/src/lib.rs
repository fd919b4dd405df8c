//! Reconciliation engine for `Database` resources
//!
//! [`DatabaseReconciler`] drives one Database at a time through subnet
//! allocation, private DNS, the Entra administrator grant, the Flexible
//! Server, extension parameters and the user provisioning job, performing at
//! most one write per tick.

pub mod admin;
pub mod configuration;
pub mod dns;
pub mod ensure;
pub mod error;
pub mod extensions;
pub mod identity;
pub mod naming;
pub mod profile;
pub mod reconciler;
pub mod server;
pub mod storage_tier;
pub mod user_job;
pub mod watch;

#[cfg(test)]
mod testing;

pub use error::{ReconcileError, Result};
pub use identity::{
    IdentityRole, Resolution, ResolvedAdminIdentity, ResolvedIdentity, resolve_admin_identity,
    resolve_user_identity,
};
pub use reconciler::{DatabaseReconciler, Progress, Step, error_policy, reconcile};
pub use watch::databases_referencing_identity;
