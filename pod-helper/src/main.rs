use anyhow::Context;
use pod_helper::kube;
use pod_helper::{accessors, Config};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.clone())
        .init();

    let pod_name = config
        .pod_name
        .clone()
        .context("POD_NAME must be set")?;

    tracing::info!("Namespace: {}", config.namespace);
    tracing::info!("Pod: {}", pod_name);

    // Initialize Kubernetes client
    tracing::info!("Connecting to Kubernetes...");
    let kube_client: Arc<dyn kube::PodOperations> = Arc::new(kube::KubeClient::new().await?);
    tracing::info!("Connected to Kubernetes");

    let mut pod = kube_client.get_pod(&config.namespace, &pod_name).await?;

    tracing::info!("Ready: {}", accessors::is_ready(Some(&pod)));
    tracing::info!("IP: {}", accessors::pod_ip(Some(&pod)));
    tracing::info!("Bill id: {}", accessors::bill_id_i64(&pod, 0));
    tracing::info!("Isolation: {}", accessors::isolation(&pod, ""));

    if !config.labels.is_empty() {
        let patcher = kube::PodPatcher::new(kube_client, config.namespace.clone());
        patcher.patch_labels(&mut pod, &config.labels).await?;
        tracing::info!("Applied {} labels to {}", config.labels.len(), pod_name);
    }

    Ok(())
}
