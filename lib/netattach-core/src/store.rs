//! Persistence of network annotations on pods

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use netattach_api::v1::NetworkStatus;
use serde_json::json;
use tracing::{debug, info};

use crate::annotation::{decode_network_status, encode_network_status};
use crate::config::AnnotationKeys;
use crate::{NetAttachError, Result};

/// Read/write access to pod annotations
///
/// Writes are a single read-modify-write against the pod as it was read;
/// a stale pod surfaces as an error and retrying is up to the caller.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Current value of an annotation on the pod
    fn get_annotation(&self, pod: &Pod, key: &str) -> Option<String> {
        pod.annotations().get(key).cloned()
    }

    /// Set an annotation on the pod
    async fn set_annotation(&self, pod: &Pod, key: &str, value: &str) -> Result<()>;
}

/// AnnotationStore backed by the Kubernetes API server
pub struct KubeAnnotationStore {
    client: Client,
}

impl KubeAnnotationStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a store from the default kubeconfig or in-cluster config
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AnnotationStore for KubeAnnotationStore {
    async fn set_annotation(&self, pod: &Pod, key: &str, value: &str) -> Result<()> {
        let namespace = pod.namespace().unwrap_or_else(|| "default".to_string());
        let name = pod.name_any();
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &namespace);

        let mut metadata = json!({ "annotations": { key: value } });
        // Pin the version that was read so a concurrent update is a conflict
        if let Some(resource_version) = pod.resource_version() {
            metadata["resourceVersion"] = json!(resource_version);
        }
        let patch = json!({ "metadata": metadata });

        pods.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        info!("Updated annotation {} on pod {}/{}", key, namespace, name);
        Ok(())
    }
}

/// Write the network status annotation of a pod
pub async fn set_network_status<S>(store: &S, pod: &Pod, statuses: &[NetworkStatus]) -> Result<()>
where
    S: AnnotationStore + ?Sized,
{
    set_network_status_with_keys(store, pod, statuses, &AnnotationKeys::default()).await
}

/// Write the network status under the current key; legacy keys are never written
pub async fn set_network_status_with_keys<S>(
    store: &S,
    pod: &Pod,
    statuses: &[NetworkStatus],
    keys: &AnnotationKeys,
) -> Result<()>
where
    S: AnnotationStore + ?Sized,
{
    let value = encode_network_status(statuses)?;
    debug!(
        "Setting {} network statuses on pod {}",
        statuses.len(),
        pod.name_any()
    );
    store.set_annotation(pod, &keys.status, &value).await
}

/// Read the network status through a store, falling back to legacy keys
pub fn read_network_status<S>(store: &S, pod: &Pod, keys: &AnnotationKeys) -> Result<Vec<NetworkStatus>>
where
    S: AnnotationStore + ?Sized,
{
    let (key, value) = keys
        .status_read_order()
        .find_map(|key| store.get_annotation(pod, key).map(|value| (key, value)))
        .ok_or_else(|| NetAttachError::MissingAnnotation(keys.status.clone()))?;
    if key != keys.status {
        debug!(
            "Reading network status of pod {} from legacy annotation {}",
            pod.name_any(),
            key
        );
    }
    decode_network_status(&value)
}
