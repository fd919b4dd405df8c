//! In-memory object store for tests

use crate::error::{Result, StoreError};
use crate::store::{ObjectStore, StoredObject, describe, object_key, spec_and_labels_patch};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Store operation, used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    List,
    Create,
    Patch,
    UpdateStatus,
    Delete,
}

type ObjectKey = (String, String, String, String);

/// [`ObjectStore`] keeping objects as JSON in memory
///
/// Mimics the bits of API server behaviour the reconciler relies on: unique
/// names per kind and namespace, `resourceVersion` checks on writes, JSON
/// merge patches that keep fields the typed model does not know about, a
/// status subresource that patches do not touch, and label-filtered lists.
/// Owner-reference garbage collection is not emulated.
#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<BTreeMap<ObjectKey, Value>>,
    failures: Mutex<HashMap<StoreOp, VecDeque<StoreError>>>,
    version: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with `err`
    pub async fn fail_next(&self, op: StoreOp, err: StoreError) {
        self.failures.lock().await.entry(op).or_default().push_back(err);
    }

    /// Number of stored objects of kind `K`
    pub async fn count<K: StoredObject>(&self) -> usize {
        let api_version = K::api_version(&()).to_string();
        let kind = K::kind(&()).to_string();
        self.objects
            .lock()
            .await
            .keys()
            .filter(|(v, k, _, _)| *v == api_version && *k == kind)
            .count()
    }

    /// Stored JSON of an object, including fields `K` does not model
    pub async fn get_raw<K: StoredObject>(&self, namespace: &str, name: &str) -> Option<Value> {
        self.objects
            .lock()
            .await
            .get(&Self::key::<K>(namespace, name))
            .cloned()
    }

    /// Overwrite the stored JSON of an existing object
    pub async fn put_raw<K: StoredObject>(&self, namespace: &str, name: &str, value: Value) {
        self.objects
            .lock()
            .await
            .insert(Self::key::<K>(namespace, name), value);
    }

    async fn injected(&self, op: StoreOp) -> Result<()> {
        match self.failures.lock().await.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn key<K: StoredObject>(namespace: &str, name: &str) -> ObjectKey {
        (
            K::api_version(&()).to_string(),
            K::kind(&()).to_string(),
            namespace.to_string(),
            name.to_string(),
        )
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn check_version(stored: &Value, incoming: &Value, what: &str) -> Result<()> {
        let incoming_rv = &incoming["metadata"]["resourceVersion"];
        if !incoming_rv.is_null() && *incoming_rv != stored["metadata"]["resourceVersion"] {
            return Err(StoreError::Conflict(what.to_string()));
        }
        Ok(())
    }
}

/// RFC 7386 JSON merge patch
fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(fields) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Default::default());
    }
    if let Value::Object(existing) = target {
        for (key, value) in fields {
            if value.is_null() {
                existing.remove(key);
            } else {
                merge_patch(existing.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

fn labels_match(obj: &Value, selector: &BTreeMap<String, String>) -> bool {
    selector
        .iter()
        .all(|(k, v)| obj["metadata"]["labels"][k].as_str() == Some(v.as_str()))
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        self.injected(StoreOp::Get).await?;
        let objects = self.objects.lock().await;
        match objects.get(&Self::key::<K>(namespace, name)) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn list<K: StoredObject>(
        &self,
        namespace: Option<&str>,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<K>> {
        self.injected(StoreOp::List).await?;
        let api_version = K::api_version(&()).to_string();
        let kind = K::kind(&()).to_string();

        let objects = self.objects.lock().await;
        objects
            .iter()
            .filter(|((v, k, ns, _), _)| {
                *v == api_version && *k == kind && namespace.is_none_or(|want| *ns == want)
            })
            .filter(|(_, value)| labels_match(value, labels))
            .map(|(_, value)| serde_json::from_value(value.clone()).map_err(StoreError::from))
            .collect()
    }

    async fn create<K: StoredObject>(&self, obj: &K) -> Result<K> {
        self.injected(StoreOp::Create).await?;
        let (namespace, name) = object_key(obj)?;
        let key = Self::key::<K>(&namespace, &name);

        let mut objects = self.objects.lock().await;
        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists(describe::<K>(&namespace, &name)));
        }

        let mut value = serde_json::to_value(obj)?;
        let version = self.next_version();
        value["apiVersion"] = Value::String(K::api_version(&()).to_string());
        value["kind"] = Value::String(K::kind(&()).to_string());
        value["metadata"]["resourceVersion"] = Value::String(version.clone());
        value["metadata"]["uid"] = Value::String(format!("uid-{version}"));

        objects.insert(key, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn patch_spec_and_labels<K: StoredObject>(&self, obj: &K) -> Result<K> {
        self.injected(StoreOp::Patch).await?;
        let (namespace, name) = object_key(obj)?;
        let what = describe::<K>(&namespace, &name);

        let mut objects = self.objects.lock().await;
        let stored = objects
            .get_mut(&Self::key::<K>(&namespace, &name))
            .ok_or_else(|| StoreError::NotFound(what.clone()))?;

        let mut patch = spec_and_labels_patch(obj)?;
        Self::check_version(stored, &patch, &what)?;
        if let Some(meta) = patch["metadata"].as_object_mut() {
            meta.remove("resourceVersion");
        }

        merge_patch(stored, &patch);
        stored["metadata"]["resourceVersion"] = Value::String(self.next_version());
        Ok(serde_json::from_value(stored.clone())?)
    }

    async fn update_status<K: StoredObject>(&self, obj: &K) -> Result<K> {
        self.injected(StoreOp::UpdateStatus).await?;
        let (namespace, name) = object_key(obj)?;
        let what = describe::<K>(&namespace, &name);

        let mut objects = self.objects.lock().await;
        let stored = objects
            .get_mut(&Self::key::<K>(&namespace, &name))
            .ok_or_else(|| StoreError::NotFound(what.clone()))?;

        let value = serde_json::to_value(obj)?;
        Self::check_version(stored, &value, &what)?;

        stored["status"] = value.get("status").cloned().unwrap_or(Value::Null);
        stored["metadata"]["resourceVersion"] = Value::String(self.next_version());
        Ok(serde_json::from_value(stored.clone())?)
    }

    async fn delete<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<()> {
        self.injected(StoreOp::Delete).await?;
        self.objects
            .lock()
            .await
            .remove(&Self::key::<K>(namespace, name))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(describe::<K>(namespace, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispg_api::{ApplicationIdentity, ApplicationIdentitySpec, ApplicationIdentityStatus};
    use kube::Resource;

    fn identity(name: &str, team: &str) -> ApplicationIdentity {
        let mut identity = ApplicationIdentity::new(name, ApplicationIdentitySpec::default());
        identity.meta_mut().namespace = Some("team-a".to_string());
        identity.meta_mut().labels = Some(BTreeMap::from([("team".to_string(), team.to_string())]));
        identity
    }

    #[tokio::test]
    async fn test_create_get_and_duplicate() {
        let store = InMemoryStore::new();
        let created = store.create(&identity("a", "x")).await.unwrap();
        assert!(created.meta().uid.is_some());
        assert!(created.meta().resource_version.is_some());

        let fetched: Option<ApplicationIdentity> = store.get("team-a", "a").await.unwrap();
        assert_eq!(fetched.unwrap().meta().uid, created.meta().uid);

        let err = store.create(&identity("a", "x")).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = InMemoryStore::new();
        let fetched: Option<ApplicationIdentity> = store.get("team-a", "nope").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_namespace_and_labels() {
        let store = InMemoryStore::new();
        store.create(&identity("a", "x")).await.unwrap();
        store.create(&identity("b", "y")).await.unwrap();

        let selector = BTreeMap::from([("team".to_string(), "x".to_string())]);
        let matched: Vec<ApplicationIdentity> = store.list(Some("team-a"), &selector).await.unwrap();
        assert_eq!(matched.len(), 1);

        let all: Vec<ApplicationIdentity> = store.list(None, &BTreeMap::new()).await.unwrap();
        assert_eq!(all.len(), 2);

        let other_ns: Vec<ApplicationIdentity> =
            store.list(Some("team-b"), &BTreeMap::new()).await.unwrap();
        assert!(other_ns.is_empty());
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let store = InMemoryStore::new();
        let created = store.create(&identity("a", "x")).await.unwrap();

        let mut first = created.clone();
        first.meta_mut().labels = None;
        store.patch_spec_and_labels(&first).await.unwrap();

        let err = store.patch_spec_and_labels(&created).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_patch_keeps_status_and_update_status_sets_it() {
        let store = InMemoryStore::new();
        let mut created = store.create(&identity("a", "x")).await.unwrap();

        created.status = Some(ApplicationIdentityStatus {
            principal_id: Some("pid".to_string()),
            ..Default::default()
        });
        let with_status = store.update_status(&created).await.unwrap();
        assert_eq!(
            with_status.status.as_ref().and_then(|s| s.principal_id.as_deref()),
            Some("pid")
        );

        let mut relabelled = with_status.clone();
        relabelled.status = None;
        let patched = store.patch_spec_and_labels(&relabelled).await.unwrap();
        assert!(patched.status.is_some());
    }

    #[tokio::test]
    async fn test_patch_keeps_unknown_spec_fields() {
        let store = InMemoryStore::new();
        let created = store.create(&identity("a", "x")).await.unwrap();

        let mut raw = store.get_raw::<ApplicationIdentity>("team-a", "a").await.unwrap();
        raw["spec"]["tags"] = serde_json::json!({ "cost-centre": "42" });
        store.put_raw::<ApplicationIdentity>("team-a", "a", raw).await;

        let mut relabelled = created.clone();
        relabelled.meta_mut().labels = Some(BTreeMap::from([("team".to_string(), "y".to_string())]));
        store.patch_spec_and_labels(&relabelled).await.unwrap();

        let raw = store.get_raw::<ApplicationIdentity>("team-a", "a").await.unwrap();
        assert_eq!(raw["spec"]["tags"]["cost-centre"], "42");
        assert_eq!(raw["metadata"]["labels"]["team"], "y");
        assert_ne!(raw["metadata"]["resourceVersion"], created.meta().resource_version.clone().unwrap());
    }

    #[test]
    fn test_merge_patch() {
        let mut target = serde_json::json!({ "a": { "b": 1, "c": 2 }, "d": [1, 2] });
        merge_patch(
            &mut target,
            &serde_json::json!({ "a": { "b": 3, "c": null }, "d": [3], "e": "new" }),
        );
        assert_eq!(target, serde_json::json!({ "a": { "b": 3 }, "d": [3], "e": "new" }));
    }

    #[tokio::test]
    async fn test_delete_and_injected_failure() {
        let store = InMemoryStore::new();
        store.create(&identity("a", "x")).await.unwrap();

        store
            .fail_next(StoreOp::Delete, StoreError::Conflict("injected".to_string()))
            .await;
        assert!(store.delete::<ApplicationIdentity>("team-a", "a").await.is_err());

        store.delete::<ApplicationIdentity>("team-a", "a").await.unwrap();
        assert_eq!(store.count::<ApplicationIdentity>().await, 0);

        let err = store.delete::<ApplicationIdentity>("team-a", "a").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
