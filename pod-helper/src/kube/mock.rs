use crate::error::{PodHelperError, PodHelperResult};
use crate::kube::traits::PodOperations;
use async_trait::async_trait;
use json_patch::Patch;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// A patch as received by the mock, kept for assertions
#[derive(Debug, Clone)]
pub struct SubmittedPatch {
    pub namespace: String,
    pub name: String,
    pub patch: Patch,
}

/// Mock implementation of PodOperations for unit testing
///
/// Stored pods are patched with the same JSON Patch semantics the API server
/// applies, so an `add` or `replace` against a missing path fails here too.
#[derive(Clone)]
pub struct MockPodOperations {
    pods: Arc<Mutex<HashMap<String, Pod>>>,
    submitted: Arc<Mutex<Vec<SubmittedPatch>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockPodOperations {
    /// Create a new mock with no pods
    pub fn new() -> Self {
        Self {
            pods: Arc::new(Mutex::new(HashMap::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Add a pod to the mock store
    pub fn add_pod(&self, namespace: &str, pod: Pod) {
        let name = pod.metadata.name.clone().unwrap_or_default();
        let key = self.make_key(namespace, &name);
        self.pods.lock().unwrap().insert(key, pod);
    }

    /// Make every subsequent patch fail with the given message
    pub fn fail_patches_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// All patches received so far, in submission order
    pub fn submitted(&self) -> Vec<SubmittedPatch> {
        self.submitted.lock().unwrap().clone()
    }

    /// Helper to create a test pod
    pub fn create_test_pod(name: &str, namespace: &str, labels: BTreeMap<String, String>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                labels: if labels.is_empty() { None } else { Some(labels) },
                resource_version: Some("1".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn make_key(&self, namespace: &str, name: &str) -> String {
        format!("{}/{}", namespace, name)
    }
}

impl Default for MockPodOperations {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PodOperations for MockPodOperations {
    async fn get_pod(&self, namespace: &str, name: &str) -> PodHelperResult<Pod> {
        let key = self.make_key(namespace, name);
        let pods = self.pods.lock().unwrap();

        pods.get(&key)
            .cloned()
            .ok_or_else(|| PodHelperError::Kubernetes(format!("Pod not found: {}", key)))
    }

    async fn json_patch_pod(&self, namespace: &str, name: &str, patch: &Patch) -> PodHelperResult<Pod> {
        self.submitted.lock().unwrap().push(SubmittedPatch {
            namespace: namespace.to_string(),
            name: name.to_string(),
            patch: patch.clone(),
        });

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(PodHelperError::Kubernetes(message));
        }

        let key = self.make_key(namespace, name);
        let mut pods = self.pods.lock().unwrap();

        let pod = pods
            .get(&key)
            .ok_or_else(|| PodHelperError::Kubernetes(format!("Pod not found: {}", key)))?;

        let mut doc = serde_json::to_value(pod)
            .map_err(|e| PodHelperError::Internal(format!("Failed to encode pod: {}", e)))?;
        json_patch::patch(&mut doc, &patch.0)
            .map_err(|e| PodHelperError::Kubernetes(format!("Invalid patch for {}: {}", key, e)))?;

        let mut updated_pod: Pod = serde_json::from_value(doc)
            .map_err(|e| PodHelperError::Internal(format!("Failed to decode pod: {}", e)))?;

        // Increment resource version
        let new_version = updated_pod
            .metadata
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            .wrapping_add(1)
            .to_string();
        updated_pod.metadata.resource_version = Some(new_version);

        pods.insert(key, updated_pod.clone());

        Ok(updated_pod)
    }
}
