//! Generic create-or-sync of resources owned by a `Database`
//!
//! Every dependent resource follows the same pattern: derive its name from
//! the Database, read it, create it with a controller owner reference when it
//! is missing, and otherwise bring spec and labels in line with
//! [`sync_spec_and_labels`].

use crate::error::Result;
use crate::naming::database_labels;
use dispg_api::{
    Database, FlexibleServer, FlexibleServersAdministrator, FlexibleServersConfiguration,
    PrivateDnsZone, PrivateDnsZonesVirtualNetworkLink,
};
use dispg_store::{ActionType, ObjectStore, StoreError, StoredObject, sync_spec_and_labels};
use kube::core::object::HasSpec;
use kube::{Resource, ResourceExt};
use tracing::{debug, info};

/// A resource kind the reconciler creates on behalf of a `Database`
pub trait DependentResource: StoredObject + HasSpec<Spec: PartialEq + Send + Sync> {
    fn build(name: &str, spec: Self::Spec) -> Self;
}

macro_rules! dependent_resource {
    ($($kind:ty),+ $(,)?) => {
        $(
            impl DependentResource for $kind {
                fn build(name: &str, spec: Self::Spec) -> Self {
                    <$kind>::new(name, spec)
                }
            }
        )+
    };
}

dependent_resource!(
    PrivateDnsZone,
    PrivateDnsZonesVirtualNetworkLink,
    FlexibleServersAdministrator,
    FlexibleServer,
    FlexibleServersConfiguration,
);

/// Namespace of `db`, which is also where its dependents live
pub fn database_namespace(db: &Database) -> Result<String> {
    db.namespace().ok_or_else(|| {
        StoreError::MissingMetadata(format!("Database {} has no namespace", db.name_any())).into()
    })
}

/// Whether `obj` carries a controller owner reference to `db`
pub fn is_controlled_by<K: Resource>(obj: &K, db: &Database) -> bool {
    let Some(uid) = db.uid() else {
        return false;
    };
    obj.owner_references()
        .iter()
        .any(|owner| owner.controller == Some(true) && owner.uid == uid)
}

/// Create `name` with `desired` if it is missing, otherwise sync it
pub async fn ensure_owned<K, S>(
    store: &S,
    db: &Database,
    name: &str,
    desired: K::Spec,
) -> Result<ActionType>
where
    K: DependentResource,
    S: ObjectStore,
{
    let namespace = database_namespace(db)?;

    if let Some(existing) = store.get::<K>(&namespace, name).await? {
        return sync_existing(store, db, existing, desired).await;
    }

    let owner = db.controller_owner_ref(&()).ok_or_else(|| {
        StoreError::MissingMetadata(format!("Database {namespace}/{} has no uid", db.name_any()))
    })?;

    let mut obj = K::build(name, desired);
    let meta = obj.meta_mut();
    meta.namespace = Some(namespace.clone());
    meta.labels = Some(database_labels(db));
    meta.owner_references = Some(vec![owner]);

    match store.create(&obj).await {
        Ok(_) => {
            info!(kind = %K::kind(&()), %namespace, name, "Created dependent resource");
            Ok(ActionType::Create)
        }
        Err(err) if err.is_already_exists() => {
            // Created by an earlier tick whose read we did not see
            debug!(kind = %K::kind(&()), %namespace, name, "Dependent resource already exists");
            Ok(ActionType::NoOp)
        }
        Err(err) => Err(err.into()),
    }
}

/// Bring an existing dependent in line with `desired`, writing only on drift
pub async fn sync_existing<K, S>(
    store: &S,
    db: &Database,
    mut existing: K,
    desired: K::Spec,
) -> Result<ActionType>
where
    K: DependentResource,
    S: ObjectStore,
{
    let current_labels = existing.meta().labels.clone();
    let (labels, updated) = sync_spec_and_labels(
        existing.spec_mut(),
        desired,
        current_labels,
        &database_labels(db),
    );

    let namespace = existing.namespace().unwrap_or_default();
    let name = existing.name_any();
    if !updated {
        debug!(kind = %K::kind(&()), %namespace, %name, "Dependent resource up to date");
        return Ok(ActionType::NoOp);
    }

    existing.meta_mut().labels = Some(labels);
    store.patch_spec_and_labels(&existing).await?;
    info!(kind = %K::kind(&()), %namespace, %name, "Updated dependent resource");
    Ok(ActionType::Update)
}
