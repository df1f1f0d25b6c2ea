use super::*;
use crate::test_support::{
    MockPublishView, MockTracking, RecordingConnection, connected_gateway, seed_managed_asset,
};
use fcu_core::config::DEFAULT_TASK_TYPE_ID;
use fcu_core::tracking::{ComponentRecord, StatusRecord, TaskRecord};
use fcu_infrastructure::FsEngineEditor;
use serde_json::Value;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

struct Harness {
    _temp: TempDir,
    editor: Arc<FsEngineEditor>,
    view: Arc<MockPublishView>,
    connection: Arc<RecordingConnection>,
    tracking: Arc<MockTracking>,
    orchestrator: PublishOrchestrator,
}

fn form(asset_name: &str, asset_type: &str) -> PublishForm {
    PublishForm {
        asset_name: asset_name.to_string(),
        asset_type: asset_type.to_string(),
        ..Default::default()
    }
}

fn context() -> LaunchContext {
    LaunchContext {
        task_id: Some("task-1".to_string()),
        shot_id: Some("shot-1".to_string()),
        frame_start: Some(1001),
        frame_end: Some(1010),
        ..Default::default()
    }
}

async fn harness(form: PublishForm) -> Harness {
    let temp = TempDir::new().unwrap();
    let editor = Arc::new(FsEngineEditor::new(temp.path()));
    let tracking = Arc::new(MockTracking::default());
    let connection = Arc::new(RecordingConnection::default());
    let (_keeper, gateway) = connected_gateway(connection.clone()).await;

    let adapters = Arc::new(AdapterRegistry::new());
    adapters.register_builtin(editor.clone());
    let managed = Arc::new(ManagedAssets::new(editor.clone(), tracking.clone()));

    let view = Arc::new(MockPublishView::with_form(form));
    let services = PublishServices {
        gateway,
        tracking: tracking.clone(),
        adapters,
        managed,
        config: PublishConfig::default(),
        context: context(),
    };
    let orchestrator = PublishOrchestrator::new(view.clone(), services);

    Harness {
        _temp: temp,
        editor,
        view,
        connection,
        tracking,
        orchestrator,
    }
}

fn rendered(id: Uuid, artifacts: RenderedArtifacts) -> PublishResult {
    PublishResult {
        success: true,
        error_msg: None,
        publish_id: Some(id),
        artifacts,
    }
}

fn movie_and_package() -> RenderedArtifacts {
    RenderedArtifacts {
        image_path: None,
        movie_path: Some("/tmp/render/chair.mp4".to_string()),
        package_path: Some("/tmp/render/chair.unitypackage".to_string()),
    }
}

async fn seed_previous(h: &Harness, asset_name: &str, asset_type: &str, version_id: &str) {
    seed_managed_asset(&h.editor, &h.tracking, asset_name, asset_type, version_id).await;
}

// ============================================================================
// Validation and the render request
// ============================================================================

#[tokio::test]
async fn test_click_sends_render_request() {
    let h = harness(form("chair", "geo")).await;

    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();

    assert_eq!(h.orchestrator.stage().await, PublishStage::AwaitingServerRender);
    assert_eq!(h.orchestrator.pending_id().await, Some(id));
    assert_eq!(h.view.last_progress(), Some(25));

    let sent = h.connection.notified(server_methods::PUBLISH);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["asset_type"], "geo");
    assert_eq!(sent[0]["publish_id"], Value::String(id.to_string()));
}

#[tokio::test]
async fn test_blank_name_returns_to_idle() {
    let h = harness(form("  ", "geo")).await;

    assert_eq!(h.orchestrator.on_publish_clicked().await.unwrap(), None);

    assert_eq!(h.orchestrator.stage().await, PublishStage::Idle);
    assert_eq!(h.view.warnings.lock().unwrap()[0].0, "Missing asset name");
    assert!(h.connection.notified(server_methods::PUBLISH).is_empty());
}

#[tokio::test]
async fn test_blank_type_returns_to_idle() {
    let h = harness(form("chair", "")).await;

    assert_eq!(h.orchestrator.on_publish_clicked().await.unwrap(), None);

    assert_eq!(h.orchestrator.stage().await, PublishStage::Idle);
    assert_eq!(h.view.warnings.lock().unwrap()[0].0, "Missing asset type");
}

#[tokio::test]
async fn test_second_click_is_refused_while_pending() {
    let h = harness(form("chair", "geo")).await;

    let first = h.orchestrator.on_publish_clicked().await.unwrap();
    let second = h.orchestrator.on_publish_clicked().await.unwrap();

    assert!(first.is_some());
    assert_eq!(second, None);
    assert_eq!(h.orchestrator.pending_id().await, first);
    assert_eq!(h.view.warnings.lock().unwrap()[0].0, "Publish in progress");
    assert_eq!(h.connection.notified(server_methods::PUBLISH).len(), 1);
}

#[tokio::test]
async fn test_undeliverable_request_fails_the_publish() {
    let h = harness(form("chair", "geo")).await;
    h.connection.fail_notifications();

    assert!(h.orchestrator.on_publish_clicked().await.is_err());

    assert_eq!(h.orchestrator.stage().await, PublishStage::Failed);
    assert_eq!(h.orchestrator.pending_id().await, None);
    assert_eq!(h.view.errors.lock().unwrap().len(), 1);
    assert_eq!(h.view.last_progress(), Some(100));
    assert_eq!(h.view.resets.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Server results
// ============================================================================

#[tokio::test]
async fn test_server_failure_creates_nothing() {
    let h = harness(form("chair", "geo")).await;
    h.orchestrator.on_publish_clicked().await.unwrap();

    let stage = h
        .orchestrator
        .on_server_result(PublishResult::failed("disk full"))
        .await;

    assert_eq!(stage, PublishStage::Failed);
    assert_eq!(h.tracking.created_version_count(), 0);
    assert!(h.tracking.created_component_names().is_empty());
    assert_eq!(h.view.warning_messages(), vec!["disk full"]);
    assert_eq!(h.view.last_progress(), Some(100));
    assert_eq!(h.orchestrator.pending_id().await, None);
}

#[tokio::test]
async fn test_result_for_another_publish_is_ignored() {
    let h = harness(form("chair", "geo")).await;
    let id = h.orchestrator.on_publish_clicked().await.unwrap();

    let stage = h
        .orchestrator
        .on_server_result(rendered(Uuid::new_v4(), movie_and_package()))
        .await;

    assert_eq!(stage, PublishStage::AwaitingServerRender);
    assert_eq!(h.orchestrator.pending_id().await, id);
    assert_eq!(h.tracking.created_version_count(), 0);
}

#[tokio::test]
async fn test_result_without_pending_publish_is_ignored() {
    let h = harness(form("chair", "geo")).await;

    let stage = h
        .orchestrator
        .on_server_result(rendered(Uuid::new_v4(), movie_and_package()))
        .await;

    assert_eq!(stage, PublishStage::Idle);
    assert_eq!(h.tracking.created_version_count(), 0);
}

#[tokio::test]
async fn test_geometry_publish_attaches_components() {
    let h = harness(form("chair", "geo")).await;
    seed_previous(&h, "chair", "geo", "av-old").await;
    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();

    let stage = h
        .orchestrator
        .on_server_result(rendered(id, movie_and_package()))
        .await;

    assert_eq!(stage, PublishStage::Done);

    let versions = h.tracking.versions.lock().unwrap().clone();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].0.parent_id, "shot-1");
    assert_eq!(versions[0].0.task_id.as_deref(), Some("task-1"));

    assert_eq!(
        h.tracking.reviewables.lock().unwrap().clone(),
        vec![("new-version-1".to_string(), "/tmp/render/chair.mp4".to_string())]
    );
    assert_eq!(h.tracking.created_component_names(), vec!["package"]);
    assert_eq!(h.tracking.published.lock().unwrap().clone(), vec!["new-version-1"]);

    let progress = h.view.progress.lock().unwrap().clone();
    assert_eq!(progress, vec![25, 50, 100]);
    assert_eq!(h.view.infos.lock().unwrap().len(), 1);
    assert_eq!(h.view.resets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_result_without_id_is_accepted() {
    let h = harness(form("chair", "geo")).await;
    seed_previous(&h, "chair", "geo", "av-old").await;
    h.orchestrator.on_publish_clicked().await.unwrap();

    let mut result = rendered(Uuid::new_v4(), movie_and_package());
    result.publish_id = None;

    assert_eq!(h.orchestrator.on_server_result(result).await, PublishStage::Done);
    assert_eq!(h.tracking.created_version_count(), 1);
}

#[tokio::test]
async fn test_image_publish_encodes_frame_range() {
    let h = harness(form("sh010", "img")).await;
    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();

    let artifacts = RenderedArtifacts {
        image_path: Some("/tmp/render/sh010.<Frame>.jpg".to_string()),
        movie_path: None,
        package_path: None,
    };
    let stage = h.orchestrator.on_server_result(rendered(id, artifacts)).await;

    assert_eq!(stage, PublishStage::Done);
    let components = h.tracking.created_components.lock().unwrap().clone();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].1, "image_sequence");
    assert!(components[0].2.ends_with("[1001-1010]"));
}

#[tokio::test]
async fn test_unsupported_type_creates_empty_version() {
    let h = harness(form("cam", "cam")).await;
    seed_previous(&h, "cam", "cam", "av-cam").await;
    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();

    let stage = h
        .orchestrator
        .on_server_result(rendered(id, movie_and_package()))
        .await;

    assert_eq!(stage, PublishStage::Done);
    assert_eq!(h.tracking.created_version_count(), 1);
    assert!(h.tracking.created_component_names().is_empty());
    assert!(h.tracking.published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_component_failure_does_not_stop_the_others() {
    let h = harness(form("chair", "geo")).await;
    seed_previous(&h, "chair", "geo", "av-old").await;
    h.tracking
        .failing_components
        .lock()
        .unwrap()
        .push("package".to_string());
    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();

    let stage = h
        .orchestrator
        .on_server_result(rendered(id, movie_and_package()))
        .await;

    assert_eq!(stage, PublishStage::Done);
    assert_eq!(h.tracking.reviewables.lock().unwrap().len(), 1);
    assert_eq!(h.tracking.published.lock().unwrap().len(), 1);
    let infos = h.view.infos.lock().unwrap().clone();
    assert!(infos[0].contains("could not be attached"));
}

// ============================================================================
// Copy-forward and task status
// ============================================================================

#[tokio::test]
async fn test_previous_version_is_carried_forward() {
    let h = harness(form("chair", "geo")).await;

    seed_previous(&h, "chair", "geo", "av-old").await;
    h.tracking
        .uses
        .lock()
        .unwrap()
        .insert("av-old".to_string(), vec!["av-dep".to_string()]);
    h.tracking.existing_components.lock().unwrap().insert(
        "av-old".to_string(),
        vec![
            ComponentRecord {
                id: "c1".to_string(),
                name: "thumbnail".to_string(),
                path: Some("/p/thumb.jpg".to_string()),
            },
            ComponentRecord {
                id: "c2".to_string(),
                name: "main".to_string(),
                path: Some("/p/chair.fbx".to_string()),
            },
            ComponentRecord {
                id: "c3".to_string(),
                name: "ftrackreview-mp4".to_string(),
                path: None,
            },
            ComponentRecord {
                id: "c4".to_string(),
                name: "notes".to_string(),
                path: None,
            },
        ],
    );

    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();
    let stage = h
        .orchestrator
        .on_server_result(rendered(id, RenderedArtifacts::default()))
        .await;

    assert_eq!(stage, PublishStage::Done);
    assert_eq!(
        h.tracking.uses.lock().unwrap().get("new-version-1").cloned(),
        Some(vec!["av-dep".to_string(), "av-old".to_string()])
    );
    let created = h.tracking.created_components.lock().unwrap().clone();
    assert_eq!(
        created,
        vec![
            (
                "new-version-1".to_string(),
                "main".to_string(),
                "/p/chair.fbx".to_string()
            ),
            ("new-version-1".to_string(), "notes".to_string(), String::new()),
        ]
    );
}

#[tokio::test]
async fn test_asset_missing_from_project_fails_before_creating() {
    let h = harness(form("chair", "geo")).await;
    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();

    let stage = h
        .orchestrator
        .on_server_result(rendered(id, movie_and_package()))
        .await;

    assert_eq!(stage, PublishStage::Failed);
    assert_eq!(h.tracking.created_version_count(), 0);
    assert!(h.tracking.published.lock().unwrap().is_empty());
    assert_eq!(
        h.view.errors.lock().unwrap().clone(),
        vec!["Publish failed: Selected asset not in project"]
    );
    assert_eq!(h.view.last_progress(), Some(100));
}

fn with_task(tracking: &MockTracking, type_id: &str) {
    tracking.tasks.lock().unwrap().insert(
        "task-1".to_string(),
        TaskRecord {
            id: "task-1".to_string(),
            name: "layout".to_string(),
            object_type_id: type_id.to_string(),
            status_id: Some("s-wip".to_string()),
        },
    );
    *tracking.statuses.lock().unwrap() = vec![
        StatusRecord {
            id: "s-wip".to_string(),
            name: "In progress".to_string(),
        },
        StatusRecord {
            id: "s-review".to_string(),
            name: "Pending Review".to_string(),
        },
    ];
}

async fn publish_with_status(h: &Harness, status: &str) -> PublishStage {
    h.view.form.lock().unwrap().status = status.to_string();
    let id = h.orchestrator.on_publish_clicked().await.unwrap().unwrap();
    h.orchestrator
        .on_server_result(rendered(id, movie_and_package()))
        .await
}

#[tokio::test]
async fn test_task_status_is_updated() {
    let h = harness(form("chair", "geo")).await;
    seed_previous(&h, "chair", "geo", "av-old").await;
    with_task(&h.tracking, DEFAULT_TASK_TYPE_ID);

    assert_eq!(publish_with_status(&h, "Pending Review").await, PublishStage::Done);
    assert_eq!(
        h.tracking.status_updates.lock().unwrap().clone(),
        vec![("task-1".to_string(), "s-review".to_string())]
    );
}

#[tokio::test]
async fn test_task_status_left_alone_when_unchanged_or_other_type() {
    let h = harness(form("chair", "geo")).await;
    seed_previous(&h, "chair", "geo", "av-old").await;
    with_task(&h.tracking, DEFAULT_TASK_TYPE_ID);
    assert_eq!(publish_with_status(&h, "In progress").await, PublishStage::Done);
    assert!(h.tracking.status_updates.lock().unwrap().is_empty());

    let h = harness(form("chair", "geo")).await;
    seed_previous(&h, "chair", "geo", "av-old").await;
    with_task(&h.tracking, "another-type");
    publish_with_status(&h, "Pending Review").await;
    assert!(h.tracking.status_updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_failure_does_not_fail_the_publish() {
    let h = harness(form("chair", "geo")).await;
    seed_previous(&h, "chair", "geo", "av-old").await;
    with_task(&h.tracking, DEFAULT_TASK_TYPE_ID);
    h.tracking.fail_status_update.store(true, Ordering::SeqCst);

    assert_eq!(publish_with_status(&h, "Pending Review").await, PublishStage::Done);
    assert!(h.view.errors.lock().unwrap().is_empty());
}
