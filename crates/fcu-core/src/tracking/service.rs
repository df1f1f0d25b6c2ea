use async_trait::async_trait;

use super::model::{ComponentRecord, NewVersion, StatusRecord, TaskRecord, VersionRecord};
use crate::error::Result;

/// The tracking-service operations the bridge uses.
///
/// This is a narrow view over the service's data model; querying and
/// browsing stay with the service's own client.
#[async_trait]
pub trait TrackingService: Send + Sync {
    /// Creates the asset if needed and a new version under it.
    async fn create_version(&self, request: &NewVersion) -> Result<VersionRecord>;

    async fn get_version(&self, version_id: &str) -> Result<Option<VersionRecord>>;

    /// Ids of the versions `version_id` depends on.
    async fn uses_versions(&self, version_id: &str) -> Result<Vec<String>>;

    async fn add_uses_versions(&self, version_id: &str, used: &[String]) -> Result<()>;

    async fn components(&self, version_id: &str) -> Result<Vec<ComponentRecord>>;

    async fn create_component(
        &self,
        version_id: &str,
        name: &str,
        path: &str,
    ) -> Result<ComponentRecord>;

    /// Attaches a movie through the review-media path.
    async fn make_reviewable(&self, version_id: &str, path: &str) -> Result<()>;

    async fn publish_version(&self, version_id: &str) -> Result<()>;

    async fn get_task(&self, task_id: &str) -> Result<Option<TaskRecord>>;

    async fn task_statuses(&self) -> Result<Vec<StatusRecord>>;

    async fn set_task_status(&self, task_id: &str, status_id: &str) -> Result<()>;

    /// Frame rate configured on the shot, if any.
    async fn shot_fps(&self, shot_id: &str) -> Result<Option<f64>>;
}
