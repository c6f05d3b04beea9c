use anyhow::{Context, Result};
/// Test utilities for integration tests
/// Manages kind cluster lifecycle and test pods
use std::collections::BTreeMap;
use std::process::{Command, Stdio};

pub const CLUSTER_NAME: &str = "pod-helper";
pub const TEST_NAMESPACE: &str = "pod-helper-test";

/// Test fixture that manages kind cluster lifecycle
pub struct KindCluster {
    cluster_name: String,
}

impl KindCluster {
    /// Get or create the test cluster, then reset the test namespace
    /// Idempotent - safe to call multiple times
    pub fn setup() -> Result<Self> {
        let cluster = Self {
            cluster_name: CLUSTER_NAME.to_string(),
        };

        if !cluster.exists()? {
            println!("Creating kind cluster: {}", CLUSTER_NAME);
            cluster.create()?;
        } else {
            println!("Using existing kind cluster: {}", CLUSTER_NAME);
        }

        cluster.reset_namespace(TEST_NAMESPACE)?;

        Ok(cluster)
    }

    fn exists(&self) -> Result<bool> {
        let output = Command::new("kind")
            .args(["get", "clusters"])
            .output()
            .context("Failed to execute 'kind get clusters'")?;

        if !output.status.success() {
            return Ok(false);
        }

        let clusters = String::from_utf8_lossy(&output.stdout);
        Ok(clusters
            .lines()
            .any(|line| line.trim() == self.cluster_name))
    }

    fn create(&self) -> Result<()> {
        let status = Command::new("kind")
            .args(["create", "cluster", "--name", &self.cluster_name, "--wait", "60s"])
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .context("Failed to run 'kind create cluster'")?;

        if !status.success() {
            anyhow::bail!("kind create cluster failed");
        }

        Ok(())
    }

    /// Delete and recreate a namespace so every run starts clean
    fn reset_namespace(&self, name: &str) -> Result<()> {
        kubectl(&["delete", "namespace", name, "--ignore-not-found=true", "--wait=true"])
            .with_context(|| format!("Failed to delete namespace {}", name))?;

        kubectl(&["create", "namespace", name])
            .with_context(|| format!("Failed to create namespace {}", name))
    }
}

fn kubectl(args: &[&str]) -> Result<()> {
    let status = Command::new("kubectl")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("Failed to execute kubectl")?;

    if !status.success() {
        anyhow::bail!("kubectl {} failed", args.join(" "));
    }

    Ok(())
}

/// Create a single-container pod with the given labels and container env
pub async fn create_test_pod(
    namespace: &str,
    name: &str,
    labels: &BTreeMap<String, String>,
    env: &BTreeMap<String, String>,
) -> Result<()> {
    use k8s_openapi::api::core::v1::Pod;
    use kube::{Api, Client};

    let client = Client::try_default().await?;
    let pods: Api<Pod> = Api::namespaced(client, namespace);

    let env: Vec<_> = env
        .iter()
        .map(|(k, v)| serde_json::json!({"name": k, "value": v}))
        .collect();

    let mut pod = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
        },
        "spec": {
            "containers": [{
                "name": "test-container",
                "image": "nginx:alpine",
                "env": env,
                "readinessProbe": {
                    "httpGet": {
                        "path": "/",
                        "port": 80,
                    },
                    "initialDelaySeconds": 1,
                    "periodSeconds": 1,
                },
            }],
        },
    });

    // an empty map would still create the field; leave it out to exercise "add"
    if !labels.is_empty() {
        pod["metadata"]["labels"] = serde_json::json!(labels);
    }

    let pp = kube::api::PostParams::default();
    pods.create(&pp, &serde_json::from_value(pod)?)
        .await
        .context("Failed to create test pod")?;

    Ok(())
}

/// Helper to delete a test pod
pub async fn delete_test_pod(namespace: &str, name: &str) -> Result<()> {
    use k8s_openapi::api::core::v1::Pod;
    use kube::{Api, Client};

    let client = Client::try_default().await?;
    let pods: Api<Pod> = Api::namespaced(client, namespace);

    let dp = kube::api::DeleteParams::default();
    pods.delete(name, &dp)
        .await
        .context("Failed to delete pod")?;

    Ok(())
}

/// Wait until the pod's Ready condition turns True and return the pod
pub async fn wait_for_pod_ready(
    namespace: &str,
    name: &str,
) -> Result<k8s_openapi::api::core::v1::Pod> {
    use k8s_openapi::api::core::v1::Pod;
    use kube::{Api, Client};
    use std::time::Duration;
    use tokio::time::sleep;

    let client = Client::try_default().await?;
    let pods: Api<Pod> = Api::namespaced(client, namespace);

    for _ in 0..60 {
        let pod = pods.get(name).await?;

        let ready = pod
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.type_ == "Ready" && c.status == "True")
            });
        if ready {
            return Ok(pod);
        }

        sleep(Duration::from_secs(1)).await;
    }

    anyhow::bail!("Pod {} did not become ready in time", name)
}
