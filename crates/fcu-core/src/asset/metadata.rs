//! Tracking metadata stored in the editor's per-asset user-data field.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Version string written into every metadata record.
pub const INTEGRATION_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON record that marks an editor asset as tracking-managed.
///
/// Field names are the persisted ones and must not change: existing projects
/// are read back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    #[serde(rename = "assetName")]
    pub asset_name: String,
    #[serde(rename = "assetType")]
    pub asset_type: String,
    #[serde(rename = "assetVersionId")]
    pub asset_version_id: String,
    #[serde(rename = "assetVersion")]
    pub asset_version: u32,
    #[serde(rename = "componentId")]
    pub component_id: String,
    #[serde(rename = "componentName", default)]
    pub component_name: String,
    #[serde(rename = "ftrack_connect_unity_version")]
    pub integration_version: String,
}

impl AssetMetadata {
    pub fn to_user_data(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a user-data string.
    ///
    /// Returns `None` for empty, malformed, or foreign user data: only
    /// records carrying a non-empty integration version are ours.
    pub fn from_user_data(user_data: &str) -> Option<Self> {
        let metadata: AssetMetadata = serde_json::from_str(user_data).ok()?;
        if metadata.integration_version.is_empty() {
            return None;
        }
        Some(metadata)
    }
}
