use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;
use uuid::Uuid;

/// What the user entered in the publish dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishForm {
    pub asset_name: String,
    pub asset_type: String,
    pub task_id: Option<String>,
    pub shot_id: Option<String>,
    /// Target task status name. Empty means "leave the status alone".
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// Stages of a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PublishStage {
    Idle,
    Validating,
    AwaitingServerRender,
    Finalizing,
    Done,
    Failed,
}

impl PublishStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PublishStage::Done | PublishStage::Failed)
    }
}

/// Files the server rendered for a publish. Paths are as the server wrote
/// them; the image path may still contain a frame placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_path: Option<String>,
}

impl RenderedArtifacts {
    pub fn is_empty(&self) -> bool {
        self.image_path.is_none() && self.movie_path.is_none() && self.package_path.is_none()
    }
}

/// Payload of the server's `publish` callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub success: bool,
    #[serde(default)]
    pub error_msg: Option<String>,
    /// Correlation id echoed from the publish request. Older servers omit it.
    #[serde(default)]
    pub publish_id: Option<Uuid>,
    #[serde(flatten)]
    pub artifacts: RenderedArtifacts,
}

impl PublishResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_msg: Some(message.into()),
            publish_id: None,
            artifacts: RenderedArtifacts::default(),
        }
    }
}

/// Body of the outbound `publish` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishCommand {
    pub asset_type: String,
    pub options: Map<String, Value>,
    pub publish_id: Uuid,
}

/// The one publish in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPublish {
    pub id: Uuid,
    pub asset_name: String,
    pub asset_type: String,
    pub task_id: Option<String>,
    pub shot_id: Option<String>,
    pub options: Map<String, Value>,
    pub comment: String,
    pub status: String,
    pub stage: PublishStage,
    pub artifacts: Option<RenderedArtifacts>,
}

impl PendingPublish {
    pub fn from_form(form: PublishForm) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_name: form.asset_name,
            asset_type: form.asset_type,
            task_id: form.task_id,
            shot_id: form.shot_id,
            options: form.options,
            comment: form.comment,
            status: form.status,
            stage: PublishStage::Validating,
            artifacts: None,
        }
    }

    pub fn command(&self) -> PublishCommand {
        PublishCommand {
            asset_type: self.asset_type.clone(),
            options: self.options.clone(),
            publish_id: self.id,
        }
    }

    /// A result belongs to this publish unless it names another one.
    pub fn accepts(&self, result: &PublishResult) -> bool {
        result.publish_id.is_none_or(|id| id == self.id)
    }
}
