use crate::constants::{ANNOTATIONS_PATH, LABELS_PATH};
use crate::error::CommonError;
use json_patch::Patch;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON Patch verb used when writing a whole metadata map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchVerb {
    Add,
    Replace,
}

impl PatchVerb {
    /// `add` when the map was absent or empty before the write, `replace` otherwise
    pub fn for_existing(existing: Option<&BTreeMap<String, String>>) -> Self {
        match existing {
            Some(map) if !map.is_empty() => PatchVerb::Replace,
            _ => PatchVerb::Add,
        }
    }
}

/// A single-operation patch that writes an entire label or annotation map.
///
/// Built fresh for every submission and thrown away afterwards. Serializes
/// as one RFC 6902 operation object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataPatch {
    #[serde(rename = "op")]
    pub verb: PatchVerb,
    pub path: &'static str,
    pub value: BTreeMap<String, String>,
}

impl MetadataPatch {
    pub fn labels(verb: PatchVerb, value: BTreeMap<String, String>) -> Self {
        Self {
            verb,
            path: LABELS_PATH,
            value,
        }
    }

    pub fn annotations(verb: PatchVerb, value: BTreeMap<String, String>) -> Self {
        Self {
            verb,
            path: ANNOTATIONS_PATH,
            value,
        }
    }

    /// Convert into an RFC 6902 document holding exactly one operation
    pub fn to_json_patch(&self) -> Result<Patch, CommonError> {
        let op = serde_json::to_value(self)?;
        Ok(serde_json::from_value(serde_json::Value::Array(vec![op]))?)
    }
}
