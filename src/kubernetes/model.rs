//! Normalized summary of a resource manifest.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identity and metadata of one resource document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceModel {
    pub api_version: Option<String>,
    pub kind: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub annotations: Option<IndexMap<String, String>>,
    pub labels: Option<IndexMap<String, String>>,
}

impl ResourceModel {
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Label value by key, if the resource has labels at all.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(key))
            .map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }
}
