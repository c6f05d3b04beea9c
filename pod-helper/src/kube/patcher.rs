use crate::error::{PodHelperError, PodHelperResult};
use crate::kube::traits::PodOperations;
use common::{MetadataPatch, PatchVerb};
use k8s_openapi::api::core::v1::Pod;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Writes labels and annotations back onto live pods
///
/// Each call sends the pod's entire resulting map in a single JSON Patch
/// operation, so two writers racing on the same pod can clobber each other.
/// Taking `&mut Pod` keeps writers of one in-memory pod serialized.
pub struct PodPatcher<T: PodOperations + ?Sized> {
    pod_ops: Arc<T>,
    namespace: String,
}

impl<T: PodOperations + ?Sized> Clone for PodPatcher<T> {
    fn clone(&self) -> Self {
        Self {
            pod_ops: Arc::clone(&self.pod_ops),
            namespace: self.namespace.clone(),
        }
    }
}

impl<T: PodOperations + ?Sized> PodPatcher<T> {
    pub fn new(pod_ops: Arc<T>, namespace: String) -> Self {
        Self { pod_ops, namespace }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Overlay `labels` onto the pod and push the merged label map
    ///
    /// The in-memory pod keeps the merged labels even if the submission fails.
    pub async fn patch_labels(
        &self,
        pod: &mut Pod,
        labels: &BTreeMap<String, String>,
    ) -> PodHelperResult<()> {
        let verb = PatchVerb::for_existing(pod.metadata.labels.as_ref());

        let merged = pod.metadata.labels.get_or_insert_with(BTreeMap::new);
        merged.extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));

        let patch = MetadataPatch::labels(verb, merged.clone());
        self.submit(pod, patch).await
    }

    /// Overlay `annotations` onto the pod and push the merged annotation map
    ///
    /// Annotations are only ever set once. If any requested key is already
    /// present the whole batch is dropped and `Ok(())` is returned without
    /// touching the pod or the API server.
    pub async fn patch_annotations(
        &self,
        pod: &mut Pod,
        annotations: &BTreeMap<String, String>,
    ) -> PodHelperResult<()> {
        if let Some(existing) = pod.metadata.annotations.as_ref() {
            if let Some(key) = annotations.keys().find(|k| existing.contains_key(*k)) {
                tracing::debug!(
                    "Annotation {} already set on pod {}, skipping patch",
                    key,
                    pod.metadata.name.as_deref().unwrap_or_default()
                );
                return Ok(());
            }
        }

        let verb = PatchVerb::for_existing(pod.metadata.annotations.as_ref());

        let merged = pod.metadata.annotations.get_or_insert_with(BTreeMap::new);
        merged.extend(annotations.iter().map(|(k, v)| (k.clone(), v.clone())));

        let patch = MetadataPatch::annotations(verb, merged.clone());
        self.submit(pod, patch).await
    }

    async fn submit(&self, pod: &Pod, patch: MetadataPatch) -> PodHelperResult<()> {
        let pod_name = pod
            .metadata
            .name
            .as_ref()
            .ok_or_else(|| PodHelperError::Internal("Pod missing name".to_string()))?;

        let json_patch = patch.to_json_patch()?;

        tracing::debug!(
            "Patching {} on pod {}/{} ({:?}, {} keys)",
            patch.path,
            self.namespace,
            pod_name,
            patch.verb,
            patch.value.len()
        );

        self.pod_ops
            .json_patch_pod(&self.namespace, pod_name, &json_patch)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kube::mock::MockPodOperations;
    use serde_json::json;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn setup(pod: &Pod) -> (Arc<MockPodOperations>, PodPatcher<MockPodOperations>) {
        let mock_ops = Arc::new(MockPodOperations::new());
        mock_ops.add_pod("default", pod.clone());

        let patcher = PodPatcher::new(mock_ops.clone(), "default".to_string());
        (mock_ops, patcher)
    }

    #[tokio::test]
    async fn test_patch_labels_add_on_unlabelled_pod() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", BTreeMap::new());
        let (mock_ops, patcher) = setup(&pod);

        patcher
            .patch_labels(&mut pod, &map(&[("isolation", "dedicated")]))
            .await
            .unwrap();

        let submitted = mock_ops.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].namespace, "default");
        assert_eq!(submitted[0].name, "pod1");
        assert_eq!(
            serde_json::to_value(&submitted[0].patch).unwrap(),
            json!([{
                "op": "add",
                "path": "/metadata/labels",
                "value": {"isolation": "dedicated"}
            }])
        );

        let stored = mock_ops.get_pod("default", "pod1").await.unwrap();
        assert_eq!(stored.metadata.labels, Some(map(&[("isolation", "dedicated")])));
    }

    #[tokio::test]
    async fn test_patch_labels_replace_sends_union() {
        let mut pod = MockPodOperations::create_test_pod(
            "pod1",
            "default",
            map(&[("app", "web"), ("isolation", "shared")]),
        );
        let (mock_ops, patcher) = setup(&pod);

        patcher
            .patch_labels(&mut pod, &map(&[("isolation", "dedicated"), ("bill-id", "7")]))
            .await
            .unwrap();

        let expected = map(&[("app", "web"), ("bill-id", "7"), ("isolation", "dedicated")]);
        assert_eq!(pod.metadata.labels, Some(expected.clone()));

        let submitted = mock_ops.submitted();
        assert_eq!(
            serde_json::to_value(&submitted[0].patch).unwrap(),
            json!([{
                "op": "replace",
                "path": "/metadata/labels",
                "value": expected
            }])
        );

        let stored = mock_ops.get_pod("default", "pod1").await.unwrap();
        assert_eq!(stored.metadata.labels, Some(expected));
    }

    #[tokio::test]
    async fn test_patch_labels_empty_map_counts_as_unlabelled() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", BTreeMap::new());
        pod.metadata.labels = Some(BTreeMap::new());
        let (mock_ops, patcher) = setup(&pod);

        patcher.patch_labels(&mut pod, &map(&[("a", "1")])).await.unwrap();

        let body = serde_json::to_value(&mock_ops.submitted()[0].patch).unwrap();
        assert_eq!(body[0]["op"], "add");
    }

    #[tokio::test]
    async fn test_patch_labels_uses_configured_namespace() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "game-servers", BTreeMap::new());
        let mock_ops = Arc::new(MockPodOperations::new());
        mock_ops.add_pod("game-servers", pod.clone());
        let patcher = PodPatcher::new(mock_ops.clone(), "game-servers".to_string());

        patcher.patch_labels(&mut pod, &map(&[("a", "1")])).await.unwrap();

        assert_eq!(patcher.namespace(), "game-servers");
        assert_eq!(mock_ops.submitted()[0].namespace, "game-servers");
    }

    #[tokio::test]
    async fn test_patch_labels_propagates_error_and_keeps_local_merge() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", map(&[("app", "web")]));
        let (mock_ops, patcher) = setup(&pod);
        mock_ops.fail_patches_with("etcdserver: request timed out");

        let err = patcher
            .patch_labels(&mut pod, &map(&[("tier", "1")]))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Kubernetes error: etcdserver: request timed out");
        assert_eq!(pod.metadata.labels, Some(map(&[("app", "web"), ("tier", "1")])));
    }

    #[tokio::test]
    async fn test_patch_labels_pod_without_name() {
        let mut pod = Pod::default();
        let mock_ops = Arc::new(MockPodOperations::new());
        let patcher = PodPatcher::new(mock_ops.clone(), "default".to_string());

        let result = patcher.patch_labels(&mut pod, &map(&[("a", "1")])).await;

        assert!(matches!(result, Err(PodHelperError::Internal(_))));
        assert!(mock_ops.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_patch_annotations_existing_key_skips_whole_batch() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", BTreeMap::new());
        pod.metadata.annotations = Some(map(&[("a", "1")]));
        let (mock_ops, patcher) = setup(&pod);

        patcher
            .patch_annotations(&mut pod, &map(&[("a", "2"), ("b", "3")]))
            .await
            .unwrap();

        assert!(mock_ops.submitted().is_empty());
        assert_eq!(pod.metadata.annotations, Some(map(&[("a", "1")])));
    }

    #[tokio::test]
    async fn test_patch_annotations_add_on_missing_map() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", BTreeMap::new());
        assert!(pod.metadata.annotations.is_none());
        let (mock_ops, patcher) = setup(&pod);

        patcher
            .patch_annotations(&mut pod, &map(&[("b", "3")]))
            .await
            .unwrap();

        assert_eq!(pod.metadata.annotations, Some(map(&[("b", "3")])));

        let submitted = mock_ops.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            serde_json::to_value(&submitted[0].patch).unwrap(),
            json!([{
                "op": "add",
                "path": "/metadata/annotations",
                "value": {"b": "3"}
            }])
        );

        let stored = mock_ops.get_pod("default", "pod1").await.unwrap();
        assert_eq!(stored.metadata.annotations, Some(map(&[("b", "3")])));
    }

    #[tokio::test]
    async fn test_patch_annotations_add_on_empty() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", BTreeMap::new());
        pod.metadata.annotations = Some(BTreeMap::new());
        let (mock_ops, patcher) = setup(&pod);

        patcher
            .patch_annotations(&mut pod, &map(&[("b", "3")]))
            .await
            .unwrap();

        let submitted = mock_ops.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            serde_json::to_value(&submitted[0].patch).unwrap(),
            json!([{
                "op": "add",
                "path": "/metadata/annotations",
                "value": {"b": "3"}
            }])
        );
    }

    #[tokio::test]
    async fn test_patch_annotations_replace_with_new_keys() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", BTreeMap::new());
        pod.metadata.annotations = Some(map(&[("online-at", "1700000000")]));
        let (mock_ops, patcher) = setup(&pod);

        patcher
            .patch_annotations(&mut pod, &map(&[("offline-at", "1700003600")]))
            .await
            .unwrap();

        let expected = map(&[("offline-at", "1700003600"), ("online-at", "1700000000")]);
        let body = serde_json::to_value(&mock_ops.submitted()[0].patch).unwrap();
        assert_eq!(body[0]["op"], "replace");
        assert_eq!(body[0]["value"], json!(expected));

        let stored = mock_ops.get_pod("default", "pod1").await.unwrap();
        assert_eq!(stored.metadata.annotations, Some(expected));
    }

    #[tokio::test]
    async fn test_patch_annotations_propagates_error() {
        let mut pod = MockPodOperations::create_test_pod("pod1", "default", BTreeMap::new());
        let (mock_ops, patcher) = setup(&pod);
        mock_ops.fail_patches_with("pods \"pod1\" is forbidden");

        let result = patcher
            .patch_annotations(&mut pod, &map(&[("online-at", "1700000000")]))
            .await;

        assert!(matches!(result, Err(PodHelperError::Kubernetes(_))));
    }
}
