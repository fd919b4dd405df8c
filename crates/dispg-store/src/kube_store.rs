//! Object store backed by the Kubernetes API server

use crate::error::{Result, StoreError};
use crate::store::{ObjectStore, StoredObject, describe, object_key, spec_and_labels_patch};
use async_trait::async_trait;
use kube::Client;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use std::collections::BTreeMap;
use tracing::debug;

/// [`ObjectStore`] that talks to the API server through a kube client
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K: StoredObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// `k1=v1,k2=v2` label selector
fn label_selector(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        match self.api::<K>(namespace).get(name).await {
            Ok(obj) => Ok(Some(obj)),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
            Err(e) => Err(StoreError::from_kube(e, describe::<K>(namespace, name))),
        }
    }

    async fn list<K: StoredObject>(
        &self,
        namespace: Option<&str>,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<K>> {
        let api: Api<K> = match namespace {
            Some(ns) => self.api(ns),
            None => Api::all(self.client.clone()),
        };

        let mut params = ListParams::default();
        if !labels.is_empty() {
            params = params.labels(&label_selector(labels));
        }

        let list = api
            .list(&params)
            .await
            .map_err(|e| StoreError::from_kube(e, format!("list {}", K::kind(&()))))?;
        debug!(kind = %K::kind(&()), count = list.items.len(), "listed objects");
        Ok(list.items)
    }

    async fn create<K: StoredObject>(&self, obj: &K) -> Result<K> {
        let (namespace, name) = object_key(obj)?;
        self.api::<K>(&namespace)
            .create(&PostParams::default(), obj)
            .await
            .map_err(|e| StoreError::from_kube(e, describe::<K>(&namespace, &name)))
    }

    async fn patch_spec_and_labels<K: StoredObject>(&self, obj: &K) -> Result<K> {
        let (namespace, name) = object_key(obj)?;
        let patch = spec_and_labels_patch(obj)?;
        self.api::<K>(&namespace)
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| StoreError::from_kube(e, describe::<K>(&namespace, &name)))
    }

    async fn update_status<K: StoredObject>(&self, obj: &K) -> Result<K> {
        let (namespace, name) = object_key(obj)?;

        let value = serde_json::to_value(obj)?;
        let patch = serde_json::json!({
            "metadata": { "resourceVersion": obj.meta().resource_version },
            "status": value.get("status").cloned().unwrap_or(serde_json::Value::Null),
        });

        self.api::<K>(&namespace)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| StoreError::from_kube(e, describe::<K>(&namespace, &name)))
    }

    async fn delete<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<()> {
        self.api::<K>(namespace)
            .delete(name, &DeleteParams::background())
            .await
            .map_err(|e| StoreError::from_kube(e, describe::<K>(namespace, name)))?;
        Ok(())
    }
}
