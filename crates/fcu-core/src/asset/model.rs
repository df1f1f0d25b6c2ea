use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything an adapter needs to bring one tracking-service component into
/// the editor project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    /// File on disk resolved from the component's location.
    pub file_path: PathBuf,
    /// Directory inside the project the file is copied into.
    pub destination: PathBuf,
    pub asset_name: String,
    pub asset_type: String,
    pub asset_version_id: String,
    pub asset_version: u32,
    pub component_id: String,
    pub component_name: String,
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

/// Editor import settings the adapters care about.
///
/// `BTreeMap` keeps the serialized form stable between writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub import_animation: bool,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

/// What the editor stores next to an imported asset: its import settings
/// and the free-form user-data string holding our metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImporterRecord {
    pub settings: ImportSettings,
    #[serde(default)]
    pub user_data: String,
}

/// Reference to an object already living in the editor project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub guid: String,
}

impl ObjectRef {
    pub fn new(guid: impl Into<String>) -> Self {
        Self { guid: guid.into() }
    }
}

/// Outcome of a successful import or version change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedAsset {
    /// Path of the copied file inside the project.
    pub path: PathBuf,
    pub settings: ImportSettings,
    pub message: String,
}

/// A named file to attach to a tracking-service version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedComponent {
    pub name: String,
    pub path: String,
}

impl PublishedComponent {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Reviewable components go through the review-media path.
    pub fn is_reviewable(&self) -> bool {
        self.name.contains("reviewable")
    }
}

/// Describes an option a dialog can present for an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    pub label: String,
    pub default: Value,
}

impl OptionSpec {
    pub fn flag(name: &str, label: &str, default: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            default: Value::Bool(default),
        }
    }
}

/// Input of `publish_asset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub asset_type: String,
    pub asset_name: String,
    pub asset_version_id: String,
    pub frame_start: Option<i64>,
    pub frame_end: Option<i64>,
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}
