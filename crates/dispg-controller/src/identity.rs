//! Identity resolution
//!
//! A Database names its admin and user identities either literally or by
//! referencing an `ApplicationIdentity`. A reference that is missing, not
//! Ready, or not yet populated is an expected transient state reported as
//! [`Resolution::NotReady`]; only malformed specs are errors.

use crate::error::{ReconcileError, Result};
use dispg_api::{ApplicationIdentity, Database, IdentitySource};
use dispg_store::ObjectStore;
use kube::ResourceExt;
use tracing::info;

/// Which identity of the Database is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRole {
    Admin,
    User,
}

impl std::fmt::Display for IdentityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityRole::Admin => write!(f, "admin"),
            IdentityRole::User => write!(f, "user"),
        }
    }
}

/// Outcome of a lookup that may have to wait for another controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Ready(T),
    NotReady(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub name: String,
    pub principal_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAdminIdentity {
    pub identity: ResolvedIdentity,
    pub service_account_name: String,
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

/// Resolve one identity source of `db`
pub async fn resolve_identity_source<S: ObjectStore>(
    store: &S,
    db: &Database,
    role: IdentityRole,
    source: &IdentitySource,
) -> Result<Resolution<ResolvedIdentity>> {
    let Some(identity_ref) = &source.identity_ref else {
        let name = trimmed(&source.name);
        let principal_id = trimmed(&source.principal_id);
        if name.is_empty() || principal_id.is_empty() {
            return Err(ReconcileError::validation(format!(
                "spec.auth.{role}.identity must set both name and principalId when identityRef is not provided"
            )));
        }
        return Ok(Resolution::Ready(ResolvedIdentity {
            name: name.to_string(),
            principal_id: principal_id.to_string(),
        }));
    };

    if !trimmed(&source.name).is_empty() || !trimmed(&source.principal_id).is_empty() {
        return Err(ReconcileError::validation(format!(
            "spec.auth.{role}.identity cannot set both identityRef and name/principalId"
        )));
    }

    let ref_name = identity_ref.name.trim();
    if ref_name.is_empty() {
        return Err(ReconcileError::validation(format!(
            "spec.auth.{role}.identity.identityRef.name must be set"
        )));
    }

    let namespace = db.namespace().unwrap_or_default();
    let Some(identity) = store
        .get::<ApplicationIdentity>(&namespace, ref_name)
        .await?
    else {
        info!(%role, name = ref_name, "ApplicationIdentity not found yet");
        return Ok(Resolution::NotReady(format!(
            "ApplicationIdentity {namespace}/{ref_name} not found"
        )));
    };

    if identity.ready() == Some(false) {
        info!(%role, name = ref_name, "ApplicationIdentity not ready yet");
        return Ok(Resolution::NotReady(format!(
            "ApplicationIdentity {namespace}/{ref_name} is not Ready"
        )));
    }

    let status = identity.status.unwrap_or_default();
    let name = trimmed(&status.managed_identity_name);
    let principal_id = trimmed(&status.principal_id);
    if name.is_empty() || principal_id.is_empty() {
        info!(%role, name = ref_name, "ApplicationIdentity status not populated yet");
        return Ok(Resolution::NotReady(format!(
            "ApplicationIdentity {namespace}/{ref_name} status is not populated"
        )));
    }

    Ok(Resolution::Ready(ResolvedIdentity {
        name: name.to_string(),
        principal_id: principal_id.to_string(),
    }))
}

/// Resolve the admin identity and the service account its job runs as
pub async fn resolve_admin_identity<S: ObjectStore>(
    store: &S,
    db: &Database,
) -> Result<Resolution<ResolvedAdminIdentity>> {
    let admin = &db.spec.auth.admin;
    let identity =
        match resolve_identity_source(store, db, IdentityRole::Admin, &admin.identity).await? {
            Resolution::Ready(identity) => identity,
            Resolution::NotReady(reason) => return Ok(Resolution::NotReady(reason)),
        };

    let explicit = trimmed(&admin.service_account_name);
    let service_account_name = if !explicit.is_empty() {
        explicit
    } else {
        admin.identity.ref_name().map(str::trim).unwrap_or_default()
    };

    if service_account_name.is_empty() {
        return Err(ReconcileError::validation(
            "spec.auth.admin.serviceAccountName must be set when identityRef is not provided",
        ));
    }

    Ok(Resolution::Ready(ResolvedAdminIdentity {
        identity,
        service_account_name: service_account_name.to_string(),
    }))
}

/// Resolve the user identity
pub async fn resolve_user_identity<S: ObjectStore>(
    store: &S,
    db: &Database,
) -> Result<Resolution<ResolvedIdentity>> {
    resolve_identity_source(store, db, IdentityRole::User, &db.spec.auth.user.identity).await
}
