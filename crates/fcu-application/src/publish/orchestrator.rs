//! Publish Orchestrator.
//!
//! A publish is split between the two processes: the client validates the
//! form and asks the server to render artifacts (`publish`, fire and
//! forget), the server calls back with the rendered files, and the client
//! then registers everything with the tracking service.
//!
//! ```text
//! Idle → Validating → AwaitingServerRender → Finalizing → Done
//!                  ↘ Idle (invalid form)      ↘ Failed (from any stage)
//! ```
//!
//! There is no timeout on `AwaitingServerRender`: a server that never calls
//! back leaves the publish pending until the dialog is replaced.

use fcu_core::asset::PublishRequest;
use fcu_core::config::PublishConfig;
use fcu_core::context::LaunchContext;
use fcu_core::dialog::PublishView;
use fcu_core::publish::{
    PendingPublish, PublishForm, PublishResult, PublishStage, RenderedArtifacts,
};
use fcu_core::tracking::{NewVersion, TrackingService, VersionRecord};
use fcu_core::{FcuError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::adapters::{AdapterRegistry, IMAGE_ASSET_TYPE};
use crate::gateway::{RemoteGateway, server_methods};
use crate::managed_assets::ManagedAssets;

/// Components never carried over from a previous version.
const SKIPPED_COMPONENTS: &[&str] = &["thumbnail", "ftrackreview-mp4"];

const NOT_IN_PROJECT: &str = "Selected asset not in project";

/// Collaborators of a publish.
#[derive(Clone)]
pub struct PublishServices {
    pub gateway: RemoteGateway,
    pub tracking: Arc<dyn TrackingService>,
    pub adapters: Arc<AdapterRegistry>,
    pub managed: Arc<ManagedAssets>,
    pub config: PublishConfig,
    pub context: LaunchContext,
}

/// What finalizing produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishSummary {
    pub version: VersionRecord,
    pub attached: usize,
    pub failed: usize,
    pub message: Option<String>,
}

struct State {
    stage: PublishStage,
    pending: Option<PendingPublish>,
}

/// Drives one publish dialog.
pub struct PublishOrchestrator {
    view: Arc<dyn PublishView>,
    services: PublishServices,
    state: Mutex<State>,
}

impl PublishOrchestrator {
    pub fn new(view: Arc<dyn PublishView>, services: PublishServices) -> Self {
        Self {
            view,
            services,
            state: Mutex::new(State {
                stage: PublishStage::Idle,
                pending: None,
            }),
        }
    }

    pub fn view(&self) -> &Arc<dyn PublishView> {
        &self.view
    }

    pub async fn stage(&self) -> PublishStage {
        self.state.lock().await.stage
    }

    /// Correlation id of the publish waiting for the server, if any.
    pub async fn pending_id(&self) -> Option<Uuid> {
        self.state.lock().await.pending.as_ref().map(|p| p.id)
    }

    /// Starts a publish from the dialog's current form.
    ///
    /// # Returns
    ///
    /// The correlation id sent to the server, or `None` when the form was
    /// invalid or another publish is still outstanding.
    ///
    /// # Errors
    ///
    /// The gateway error when the render request could not be sent; the
    /// publish is then `Failed`.
    pub async fn on_publish_clicked(&self) -> Result<Option<Uuid>> {
        let mut state = self.state.lock().await;

        if let Some(pending) = &state.pending {
            tracing::warn!(publish_id = %pending.id, "[Publish] Already in progress");
            self.view.show_warning(
                "Publish in progress",
                "Wait for the current publish to finish",
            );
            return Ok(None);
        }

        state.stage = PublishStage::Validating;
        let form = self.view.form();
        if let Some((subject, message)) = validate_form(&form) {
            self.view.show_warning(subject, message);
            state.stage = PublishStage::Idle;
            return Ok(None);
        }

        let mut pending = PendingPublish::from_form(form);
        if pending.task_id.is_none() {
            pending.task_id = self.services.context.task_id.clone();
        }
        if pending.shot_id.is_none() {
            pending.shot_id = self.services.context.shot_id.clone();
        }
        pending.stage = PublishStage::AwaitingServerRender;
        let id = pending.id;
        let command = pending.command();

        if let Err(e) = self
            .services
            .gateway
            .call_async(server_methods::PUBLISH, &command)
            .await
        {
            tracing::error!(publish_id = %id, "[Publish] Render request failed: {}", e);
            self.view.show_error(&format!("Publish failed: {}", e));
            self.finish(&mut state, PublishStage::Failed);
            return Err(e);
        }

        tracing::info!(
            publish_id = %id,
            asset_type = %pending.asset_type,
            "[Publish] Waiting for server to render '{}'",
            pending.asset_name
        );
        state.pending = Some(pending);
        state.stage = PublishStage::AwaitingServerRender;
        self.view.set_progress(25);
        Ok(Some(id))
    }

    /// Handles the server's render result.
    ///
    /// Results that arrive with nothing pending, or that name another
    /// publish, are ignored.
    ///
    /// # Returns
    ///
    /// The stage after handling the result.
    pub async fn on_server_result(&self, result: PublishResult) -> PublishStage {
        let mut state = self.state.lock().await;

        let accepted = match &state.pending {
            None => {
                tracing::warn!("[Publish] Server result with no publish pending, ignored");
                false
            }
            Some(pending) if !pending.accepts(&result) => {
                tracing::warn!(
                    expected = %pending.id,
                    received = ?result.publish_id,
                    "[Publish] Server result for another publish, ignored"
                );
                false
            }
            Some(_) => true,
        };
        let pending = match state.pending.take() {
            Some(pending) if accepted => pending,
            other => {
                state.pending = other;
                return state.stage;
            }
        };

        if !result.success {
            let message = result
                .error_msg
                .unwrap_or_else(|| "the server could not render the publish".to_string());
            tracing::warn!(publish_id = %pending.id, "[Publish] Server failed: {}", message);
            self.view.show_warning("Publish failed", &message);
            self.finish(&mut state, PublishStage::Failed);
            return state.stage;
        }

        state.stage = PublishStage::Finalizing;
        let mut pending = pending;
        pending.stage = PublishStage::Finalizing;
        pending.artifacts = Some(result.artifacts);

        match self.finalize(&pending).await {
            Ok(summary) => {
                self.update_task_status(&pending).await;
                tracing::info!(
                    publish_id = %pending.id,
                    version_id = %summary.version.id,
                    attached = summary.attached,
                    failed = summary.failed,
                    "[Publish] Done"
                );
                let mut message = format!(
                    "Published {} version {}",
                    pending.asset_name, summary.version.version
                );
                if summary.failed > 0 {
                    message.push_str(&format!(
                        " ({} component(s) could not be attached)",
                        summary.failed
                    ));
                }
                self.view.show_info(&message);
                self.finish(&mut state, PublishStage::Done);
            }
            Err(e) => {
                tracing::error!(publish_id = %pending.id, "[Publish] Finalizing failed: {}", e);
                let reason = match &e {
                    FcuError::InvalidAsset(message) => message.clone(),
                    other => other.to_string(),
                };
                self.view.show_error(&format!("Publish failed: {}", reason));
                self.finish(&mut state, PublishStage::Failed);
            }
        }
        state.stage
    }

    fn finish(&self, state: &mut State, stage: PublishStage) {
        state.stage = stage;
        state.pending = None;
        self.view.set_progress(100);
        self.view.reset_options();
    }

    /// Creates the version and attaches the rendered components.
    ///
    /// Every asset type except `img` must already be in the project: its
    /// current version is where dependencies and components are carried
    /// over from. Without one nothing is created.
    ///
    /// Component attachment is at-least-once: a failing component is logged
    /// and the remaining ones are still attempted. Nothing is rolled back.
    async fn finalize(&self, pending: &PendingPublish) -> Result<PublishSummary> {
        let tracking = &self.services.tracking;
        self.view.set_progress(50);

        let parent_id = pending
            .shot_id
            .clone()
            .or_else(|| pending.task_id.clone())
            .ok_or_else(|| FcuError::invalid_asset("no shot or task to publish under"))?;

        let previous = if pending.asset_type == IMAGE_ASSET_TYPE {
            None
        } else {
            let previous = self
                .services
                .managed
                .find_version(
                    &pending.asset_name,
                    &pending.asset_type,
                    pending.task_id.as_deref(),
                )
                .await?;
            Some(previous.ok_or_else(|| FcuError::invalid_asset(NOT_IN_PROJECT))?)
        };

        let version = tracking
            .create_version(&NewVersion {
                parent_id,
                asset_name: pending.asset_name.clone(),
                asset_type: pending.asset_type.clone(),
                task_id: pending.task_id.clone(),
                comment: pending.comment.clone(),
            })
            .await?;

        if let Some(previous) = &previous {
            self.copy_forward(previous, &version).await?;
        }

        let request = PublishRequest {
            asset_type: pending.asset_type.clone(),
            asset_name: pending.asset_name.clone(),
            asset_version_id: version.id.clone(),
            frame_start: self.services.context.frame_start,
            frame_end: self.services.context.frame_end,
            options: pending
                .options
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        let default_artifacts = RenderedArtifacts::default();
        let artifacts = pending.artifacts.as_ref().unwrap_or(&default_artifacts);
        let mapping = self.services.adapters.publish_asset(artifacts, &request)?;
        if let Some(message) = &mapping.message {
            tracing::warn!("[Publish] {}", message);
        }

        let mut attached = 0;
        let mut failed = 0;
        for component in &mapping.components {
            let outcome = if component.is_reviewable() {
                tracking.make_reviewable(&version.id, &component.path).await
            } else {
                tracking
                    .create_component(&version.id, &component.name, &component.path)
                    .await
                    .map(|_| ())
            };
            match outcome {
                Ok(()) => attached += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        component = %component.name,
                        "[Publish] Could not attach component: {}",
                        e
                    );
                }
            }
        }

        if !mapping.components.is_empty() {
            tracking.publish_version(&version.id).await?;
        }

        Ok(PublishSummary {
            version,
            attached,
            failed,
            message: mapping.message,
        })
    }

    /// Carries dependency links and components over from the version of the
    /// same asset currently in the project.
    async fn copy_forward(&self, previous: &VersionRecord, version: &VersionRecord) -> Result<()> {
        let tracking = &self.services.tracking;
        let mut uses = tracking.uses_versions(&previous.id).await?;
        uses.push(previous.id.clone());
        tracking.add_uses_versions(&version.id, &uses).await?;

        for component in tracking.components(&previous.id).await? {
            if SKIPPED_COMPONENTS.contains(&component.name.as_str()) {
                continue;
            }
            let path = component.path.unwrap_or_default();
            if let Err(e) = tracking
                .create_component(&version.id, &component.name, &path)
                .await
            {
                tracing::error!(
                    component = %component.name,
                    "[Publish] Could not carry over component: {}",
                    e
                );
            }
        }
        Ok(())
    }

    /// Moves the task to the form's status when the task is of the
    /// configured type and not already there. Never fails the publish.
    async fn update_task_status(&self, pending: &PendingPublish) {
        let Some(task_id) = pending.task_id.as_deref() else {
            return;
        };
        if pending.status.is_empty() {
            return;
        }
        match self.try_update_task_status(task_id, &pending.status).await {
            Ok(true) => tracing::info!("[Publish] Task {} set to '{}'", task_id, pending.status),
            Ok(false) => {}
            Err(e) => tracing::warn!("[Publish] Could not update task status: {}", e),
        }
    }

    async fn try_update_task_status(&self, task_id: &str, status: &str) -> Result<bool> {
        let tracking = &self.services.tracking;
        let Some(task) = tracking.get_task(task_id).await? else {
            return Ok(false);
        };
        if task.object_type_id != self.services.config.task_type_id {
            return Ok(false);
        }

        let statuses = tracking.task_statuses().await?;
        let target = statuses
            .iter()
            .find(|s| s.name == status && task.status_id.as_deref() != Some(s.id.as_str()));
        let Some(target) = target else {
            return Ok(false);
        };
        tracking.set_task_status(task_id, &target.id).await?;
        Ok(true)
    }
}

/// Subject and message of the warning for an incomplete form.
fn validate_form(form: &PublishForm) -> Option<(&'static str, &'static str)> {
    if form.asset_name.trim().is_empty() {
        return Some(("Missing asset name", "The asset name can not be blank"));
    }
    if form.asset_type.trim().is_empty() {
        return Some(("Missing asset type", "The asset type can not be blank"));
    }
    None
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
