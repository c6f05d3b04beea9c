/// Label carrying the numeric bill id of a pod
pub const LABEL_BILL_ID: &str = "bill-id";

/// Label carrying the isolation level of a pod
pub const LABEL_ISOLATION: &str = "isolation";

/// Container env var consulted when the bill id label is missing
pub const ENV_PUBLISH_BILL_ID: &str = "PUBLISH_BILL_ID";

/// Container env var consulted when the isolation label is missing
pub const ENV_ISOLATION: &str = "ISOLATION";

pub const LABELS_PATH: &str = "/metadata/labels";
pub const ANNOTATIONS_PATH: &str = "/metadata/annotations";

pub const DEFAULT_NAMESPACE: &str = "default";

// Pods in this cluster report PodScheduled, Initialized, ContainersReady and Ready
pub const MIN_READINESS_CONDITIONS: usize = 4;

pub const CONDITION_TRUE: &str = "True";
