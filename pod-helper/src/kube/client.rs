use crate::error::{PodHelperError, PodHelperResult};
use crate::kube::traits::PodOperations;
use async_trait::async_trait;
use json_patch::Patch as JsonPatch;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Patch, PatchParams},
    Api, Client,
};

/// Real Kubernetes client implementation using kube-rs
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    /// Create a new Kubernetes client using the default configuration
    /// (in-cluster config or ~/.kube/config)
    pub async fn new() -> PodHelperResult<Self> {
        let client = Client::try_default().await.map_err(|e| {
            PodHelperError::Kubernetes(format!("Failed to create K8s client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Create a Kubernetes client from an explicit kube::Client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodOperations for KubeClient {
    async fn get_pod(&self, namespace: &str, name: &str) -> PodHelperResult<Pod> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = pods.get(name).await?;
        Ok(pod)
    }

    async fn json_patch_pod(&self, namespace: &str, name: &str, patch: &JsonPatch) -> PodHelperResult<Pod> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);

        let patch_params = PatchParams::default();
        let patched_pod = pods
            .patch(name, &patch_params, &Patch::<()>::Json(patch.clone()))
            .await?;

        Ok(patched_pod)
    }
}

