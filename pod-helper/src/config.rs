use common::constants::DEFAULT_NAMESPACE;
use common::CommonError;
use std::collections::BTreeMap;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace every patch is scoped to
    pub namespace: String,
    pub pod_name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            namespace: env::var("PATCH_NAMESPACE")
                .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string()),
            pod_name: env::var("POD_NAME").ok().filter(|name| !name.is_empty()),
            labels: parse_label_pairs(&env::var("POD_LABELS").unwrap_or_default())?,
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            pod_name: None,
            labels: BTreeMap::new(),
            log_level: "info".to_string(),
        }
    }
}

/// Parse "key1=value1,key2=value2" into a map; later duplicates win
fn parse_label_pairs(raw: &str) -> Result<BTreeMap<String, String>, CommonError> {
    let mut labels = BTreeMap::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CommonError::InvalidData(format!("label pair without '=': {}", pair)))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(CommonError::InvalidData(format!(
                "label pair with empty key: {}",
                pair
            )));
        }

        labels.insert(key.to_string(), value.trim().to_string());
    }

    Ok(labels)
}
