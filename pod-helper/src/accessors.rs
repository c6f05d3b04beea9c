//! Read-only helpers over a pod's metadata, spec and status.
//!
//! Nothing here fails: missing maps, lists and fields fall back to the
//! caller's default (or the empty string where no default is taken).

use common::constants::{
    CONDITION_TRUE, ENV_ISOLATION, ENV_PUBLISH_BILL_ID, LABEL_BILL_ID, LABEL_ISOLATION,
    MIN_READINESS_CONDITIONS,
};
use k8s_openapi::api::core::v1::Pod;

/// Whether a pod has reported all of its standard conditions as healthy.
///
/// A pod with fewer than four conditions has not finished reporting status and
/// is never ready. The first condition tracks scheduling/initialization rather
/// than readiness and is not checked.
pub fn is_ready(pod: Option<&Pod>) -> bool {
    let Some(conditions) = pod
        .and_then(|p| p.status.as_ref())
        .and_then(|s| s.conditions.as_ref())
    else {
        return false;
    };

    if conditions.len() < MIN_READINESS_CONDITIONS {
        return false;
    }

    conditions.iter().skip(1).all(|c| c.status == CONDITION_TRUE)
}

/// Label value for `key`, or `default` when the key is empty or absent
pub fn label_value(pod: &Pod, key: &str, default: &str) -> String {
    if key.is_empty() {
        return default.to_string();
    }

    pod.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(key))
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Value of the first env entry named `name`, searching containers in order
pub fn env_var(pod: &Pod, name: &str, default: &str) -> String {
    let Some(spec) = pod.spec.as_ref() else {
        return default.to_string();
    };

    spec.containers
        .iter()
        .flat_map(|c| c.env.iter().flatten())
        .find(|e| e.name == name)
        // entries sourced via valueFrom carry no literal value
        .map(|e| e.value.clone().unwrap_or_default())
        .unwrap_or_else(|| default.to_string())
}

pub fn env_var_int(pod: &Pod, name: &str, default: i64) -> i64 {
    let value = env_var(pod, name, "");
    if value.is_empty() {
        return default;
    }

    value.parse().unwrap_or(default)
}

/// Annotation value for `key`; empty when absent
pub fn annotation(pod: &Pod, key: &str) -> String {
    pod.metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .cloned()
        .unwrap_or_default()
}

pub fn pod_ip(pod: Option<&Pod>) -> String {
    pod.and_then(|p| p.status.as_ref())
        .and_then(|s| s.pod_ip.clone())
        .unwrap_or_default()
}

/// Bill id from the `bill-id` label, falling back to the `PUBLISH_BILL_ID`
/// container env var. Unparseable values yield `default`.
pub fn bill_id_i64(pod: &Pod, default: i64) -> i64 {
    let bill_id = label_or_env(pod, LABEL_BILL_ID, ENV_PUBLISH_BILL_ID);
    if bill_id.is_empty() {
        return default;
    }

    bill_id.parse().unwrap_or(default)
}

/// Isolation level from the `isolation` label, falling back to the
/// `ISOLATION` container env var
pub fn isolation(pod: &Pod, default: &str) -> String {
    let isolation = label_or_env(pod, LABEL_ISOLATION, ENV_ISOLATION);
    if isolation.is_empty() {
        return default.to_string();
    }

    isolation
}

// Labels override the container environment; an empty label counts as unset
fn label_or_env(pod: &Pod, label: &str, env: &str) -> String {
    let value = label_value(pod, label, "");
    if !value.is_empty() {
        return value;
    }

    env_var(pod, env, "")
}
