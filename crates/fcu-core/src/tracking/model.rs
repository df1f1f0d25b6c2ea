use serde::{Deserialize, Serialize};

/// An asset version record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    pub asset_name: String,
    pub asset_type: String,
    pub version: u32,
    pub task_id: Option<String>,
}

/// A component attached to a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: String,
    pub name: String,
    /// Filesystem path in the picked location, when it has one.
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub name: String,
    /// Type id of the task's object type.
    pub object_type_id: String,
    pub status_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    pub name: String,
}

/// Parameters for a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVersion {
    /// Parent of the asset, the shot (or task when no shot is known).
    pub parent_id: String,
    pub asset_name: String,
    pub asset_type: String,
    pub task_id: Option<String>,
    pub comment: String,
}
