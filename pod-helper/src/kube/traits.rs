use crate::error::PodHelperResult;
use async_trait::async_trait;
use json_patch::Patch;
use k8s_openapi::api::core::v1::Pod;

/// Abstraction for pod operations to enable testing with mocks
#[async_trait]
pub trait PodOperations: Send + Sync {
    /// Get a specific pod by name in a namespace
    async fn get_pod(&self, namespace: &str, name: &str) -> PodHelperResult<Pod>;

    /// Apply an RFC 6902 JSON Patch to a pod
    /// Returns the pod as stored after the patch
    async fn json_patch_pod(&self, namespace: &str, name: &str, patch: &Patch) -> PodHelperResult<Pod>;
}
