//! Object store trait definition

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use kube::Resource;
use kube::core::NamespaceResourceScope;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Any namespaced, statically typed resource the operator reads or writes
pub trait StoredObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> StoredObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Control-plane object store abstraction
///
/// The reconciler only talks to the cluster through this trait, so it can be
/// driven against the API server in production and against an in-memory
/// store in tests. Every write is subject to the store's own
/// optimistic-concurrency check on `metadata.resourceVersion`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object, `None` when it does not exist
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<Option<K>>;

    /// List objects in one namespace (or all) whose labels include `labels`
    async fn list<K: StoredObject>(
        &self,
        namespace: Option<&str>,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<K>>;

    /// Create an object. Fails with [`StoreError::AlreadyExists`] when the
    /// name is taken.
    async fn create<K: StoredObject>(&self, obj: &K) -> Result<K>;

    /// Merge `obj`'s labels and spec into the stored object
    ///
    /// Sent as a JSON merge patch guarded by `metadata.resourceVersion`, so
    /// spec fields the typed model does not carry are left as they are.
    async fn patch_spec_and_labels<K: StoredObject>(&self, obj: &K) -> Result<K>;

    /// Replace an object's status
    async fn update_status<K: StoredObject>(&self, obj: &K) -> Result<K>;

    /// Delete an object, letting the store cascade to its dependents in the
    /// background
    async fn delete<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<()>;
}

/// The merge patch [`ObjectStore::patch_spec_and_labels`] sends for `obj`
pub fn spec_and_labels_patch<K: StoredObject>(obj: &K) -> Result<serde_json::Value> {
    let value = serde_json::to_value(obj)?;
    let meta = obj.meta();
    Ok(serde_json::json!({
        "metadata": {
            "labels": meta.labels,
            "resourceVersion": meta.resource_version,
        },
        "spec": value.get("spec").cloned().unwrap_or_else(|| serde_json::json!({})),
    }))
}

/// Namespace and name of an object about to be written
pub fn object_key<K: StoredObject>(obj: &K) -> Result<(String, String)> {
    let meta = obj.meta();
    let kind = K::kind(&());

    let namespace = meta
        .namespace
        .clone()
        .ok_or_else(|| StoreError::MissingMetadata(format!("{kind} has no namespace")))?;
    let name = meta
        .name
        .clone()
        .ok_or_else(|| StoreError::MissingMetadata(format!("{kind} has no name")))?;

    Ok((namespace, name))
}

/// Human readable `Kind namespace/name`
pub fn describe<K: StoredObject>(namespace: &str, name: &str) -> String {
    format!("{} {namespace}/{name}", K::kind(&()))
}
