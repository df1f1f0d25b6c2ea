//! Hand-written doubles of the core seams, shared by the unit tests.

use async_trait::async_trait;
use fcu_core::asset::{
    AssetMetadata, EngineEditor, INTEGRATION_VERSION, ImporterRecord,
};
use fcu_core::config::ConnectionConfig;
use fcu_core::dialog::{DialogFactory, DialogKind, DialogWindow, PublishView};
use fcu_core::publish::PublishForm;
use fcu_core::session::{Connection, InboundSender, Transport, TransportError, inbound_channel};
use fcu_core::tracking::{
    ComponentRecord, NewVersion, StatusRecord, TaskRecord, TrackingService, VersionRecord,
};
use fcu_core::{FcuError, Result};
use fcu_infrastructure::FsEngineEditor;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::connection::ConnectionKeeper;
use crate::gateway::RemoteGateway;

// ============================================================================
// Transport
// ============================================================================

#[derive(Default)]
pub struct RecordingConnection {
    pub calls: Mutex<Vec<(String, String)>>,
    pub notifications: Mutex<Vec<(String, String)>>,
    pub responses: Mutex<Vec<(u64, std::result::Result<Value, String>)>>,
    pub replies: Mutex<HashMap<String, Value>>,
    ping_count: AtomicUsize,
    ping_fails: AtomicBool,
    notify_fails: AtomicBool,
    closed: AtomicBool,
}

impl RecordingConnection {
    pub fn pings(&self) -> usize {
        self.ping_count.load(Ordering::SeqCst)
    }

    pub fn fail_pings(&self) {
        self.ping_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_notifications(&self) {
        self.notify_fails.store(true, Ordering::SeqCst);
    }

    pub fn reply_to(&self, method: &str, value: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert(method.to_string(), value);
    }

    pub fn notified(&self, method: &str) -> Vec<Value> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, payload)| serde_json::from_str(payload).unwrap())
            .collect()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn call(&self, method: &str, payload: String) -> std::result::Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), payload));
        Ok(self
            .replies
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn notify(&self, method: &str, payload: String) -> std::result::Result<(), TransportError> {
        if self.is_closed() || self.notify_fails.load(Ordering::SeqCst) {
            return Err(TransportError::EndOfStream);
        }
        self.notifications
            .lock()
            .unwrap()
            .push((method.to_string(), payload));
        Ok(())
    }

    async fn respond(
        &self,
        id: u64,
        result: std::result::Result<Value, String>,
    ) -> std::result::Result<(), TransportError> {
        self.responses.lock().unwrap().push((id, result));
        Ok(())
    }

    async fn ping(&self) -> std::result::Result<(), TransportError> {
        self.ping_count.fetch_add(1, Ordering::SeqCst);
        if self.ping_fails.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout(std::time::Duration::from_secs(1)));
        }
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Fails the first `failures` attempts, then hands out `connection`.
pub struct ScriptedTransport {
    failures: usize,
    error: TransportError,
    connection: Option<Arc<RecordingConnection>>,
    attempts: AtomicUsize,
}

impl ScriptedTransport {
    pub fn always(error: TransportError) -> Self {
        Self {
            failures: usize::MAX,
            error,
            connection: None,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn refusing_then(failures: usize, connection: Arc<RecordingConnection>) -> Self {
        Self {
            failures,
            error: TransportError::Refused("not yet".to_string()),
            connection: Some(connection),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(
        &self,
        _inbound: InboundSender,
    ) -> std::result::Result<Arc<dyn Connection>, TransportError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        match &self.connection {
            Some(connection) if attempt >= self.failures => Ok(connection.clone()),
            _ => Err(self.error.clone()),
        }
    }
}

/// Hands out a new connection on every attempt.
#[derive(Default)]
pub struct FreshTransport {
    pub connections: Mutex<Vec<Arc<RecordingConnection>>>,
}

impl FreshTransport {
    pub fn latest(&self) -> Arc<RecordingConnection> {
        self.connections.lock().unwrap().last().cloned().unwrap()
    }

    pub fn connect_count(&self) -> usize {
        self.connections.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FreshTransport {
    async fn connect(
        &self,
        _inbound: InboundSender,
    ) -> std::result::Result<Arc<dyn Connection>, TransportError> {
        let connection = Arc::new(RecordingConnection::default());
        self.connections.lock().unwrap().push(connection.clone());
        Ok(connection)
    }
}

/// A keeper already connected to `connection`, and a gateway over it.
pub async fn connected_gateway(
    connection: Arc<RecordingConnection>,
) -> (Arc<ConnectionKeeper>, RemoteGateway) {
    let transport = Arc::new(ScriptedTransport::refusing_then(0, connection));
    let (tx, _rx) = inbound_channel();
    let config = ConnectionConfig {
        retry_delay_ms: 0,
        ..Default::default()
    };
    let keeper = Arc::new(ConnectionKeeper::new(transport, config, tx));
    keeper.connect().await.unwrap();
    let gateway = RemoteGateway::new(keeper.clone());
    (keeper, gateway)
}

/// A keeper that never connected, and a gateway over it.
pub fn disconnected_gateway() -> (Arc<ConnectionKeeper>, RemoteGateway) {
    let transport = Arc::new(ScriptedTransport::always(TransportError::Refused(
        "no editor".to_string(),
    )));
    let (tx, _rx) = inbound_channel();
    let keeper = Arc::new(ConnectionKeeper::new(transport, ConnectionConfig::default(), tx));
    let gateway = RemoteGateway::new(keeper.clone());
    (keeper, gateway)
}

// ============================================================================
// Dialogs
// ============================================================================

#[derive(Default)]
pub struct MockPublishView {
    pub form: Mutex<PublishForm>,
    pub progress: Mutex<Vec<u8>>,
    pub warnings: Mutex<Vec<(String, String)>>,
    pub errors: Mutex<Vec<String>>,
    pub infos: Mutex<Vec<String>>,
    pub resets: AtomicUsize,
    pub shown: AtomicBool,
    pub closed: AtomicBool,
    pub submit_on_show: AtomicBool,
}

impl MockPublishView {
    pub fn with_form(form: PublishForm) -> Self {
        Self {
            form: Mutex::new(form),
            ..Default::default()
        }
    }

    pub fn last_progress(&self) -> Option<u8> {
        self.progress.lock().unwrap().last().copied()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl PublishView for MockPublishView {
    fn show(&self) {
        self.shown.store(true, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn form(&self) -> PublishForm {
        self.form.lock().unwrap().clone()
    }

    fn set_progress(&self, percent: u8) {
        self.progress.lock().unwrap().push(percent);
    }

    fn show_warning(&self, subject: &str, message: &str) {
        self.warnings
            .lock()
            .unwrap()
            .push((subject.to_string(), message.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn show_info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn reset_options(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn submits_on_show(&self) -> bool {
        self.submit_on_show.load(Ordering::SeqCst)
    }
}

pub struct MockWindow {
    pub kind: DialogKind,
    pub shown: AtomicBool,
    pub closed: AtomicBool,
}

impl DialogWindow for MockWindow {
    fn kind(&self) -> DialogKind {
        self.kind
    }

    fn show(&self) {
        self.shown.store(true, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MockDialogFactory {
    pub windows: Mutex<Vec<Arc<MockWindow>>>,
    pub publish_views: Mutex<Vec<Arc<MockPublishView>>>,
    /// Form of the next publish views; `Some` makes them submit on show.
    pub prefilled: Mutex<Option<PublishForm>>,
}

impl DialogFactory for MockDialogFactory {
    fn open(&self, kind: DialogKind) -> Result<Arc<dyn DialogWindow>> {
        let window = Arc::new(MockWindow {
            kind,
            shown: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        });
        self.windows.lock().unwrap().push(window.clone());
        Ok(window)
    }

    fn open_publish(&self) -> Result<Arc<dyn PublishView>> {
        let view = Arc::new(match self.prefilled.lock().unwrap().clone() {
            Some(form) => {
                let view = MockPublishView::with_form(form);
                view.submit_on_show.store(true, Ordering::SeqCst);
                view
            }
            None => MockPublishView::default(),
        });
        self.publish_views.lock().unwrap().push(view.clone());
        Ok(view)
    }
}

// ============================================================================
// Project
// ============================================================================

/// Puts version `version_id` of `asset_name` into the project behind
/// `editor` and into the tracking service.
pub async fn seed_managed_asset(
    editor: &FsEngineEditor,
    tracking: &MockTracking,
    asset_name: &str,
    asset_type: &str,
    version_id: &str,
) {
    let root = editor.asset_root();
    std::fs::create_dir_all(&root).unwrap();
    let asset = root.join(format!("{}.fbx", asset_name));
    std::fs::write(&asset, b"fbx").unwrap();
    let metadata = AssetMetadata {
        asset_name: asset_name.to_string(),
        asset_type: asset_type.to_string(),
        asset_version_id: version_id.to_string(),
        asset_version: 3,
        component_id: "comp-old".to_string(),
        component_name: "main".to_string(),
        integration_version: INTEGRATION_VERSION.to_string(),
    };
    let record = ImporterRecord {
        settings: Default::default(),
        user_data: metadata.to_user_data().unwrap(),
    };
    editor.write_importer(&asset, &record).await.unwrap();

    tracking.add_version(VersionRecord {
        id: version_id.to_string(),
        asset_name: asset_name.to_string(),
        asset_type: asset_type.to_string(),
        version: 3,
        task_id: Some("task-1".to_string()),
    });
}

// ============================================================================
// Tracking service
// ============================================================================

/// In-memory tracking service recording every write.
#[derive(Default)]
pub struct MockTracking {
    pub versions: Mutex<Vec<(NewVersion, VersionRecord)>>,
    pub existing_versions: Mutex<HashMap<String, VersionRecord>>,
    pub uses: Mutex<HashMap<String, Vec<String>>>,
    pub existing_components: Mutex<HashMap<String, Vec<ComponentRecord>>>,
    pub created_components: Mutex<Vec<(String, String, String)>>,
    pub reviewables: Mutex<Vec<(String, String)>>,
    pub published: Mutex<Vec<String>>,
    pub tasks: Mutex<HashMap<String, TaskRecord>>,
    pub statuses: Mutex<Vec<StatusRecord>>,
    pub status_updates: Mutex<Vec<(String, String)>>,
    pub shot_fps: Mutex<HashMap<String, f64>>,
    /// Component names whose creation fails.
    pub failing_components: Mutex<Vec<String>>,
    pub fail_status_update: AtomicBool,
}

impl MockTracking {
    pub fn add_version(&self, version: VersionRecord) {
        self.existing_versions
            .lock()
            .unwrap()
            .insert(version.id.clone(), version);
    }

    pub fn created_version_count(&self) -> usize {
        self.versions.lock().unwrap().len()
    }

    pub fn created_component_names(&self) -> Vec<String> {
        self.created_components
            .lock()
            .unwrap()
            .iter()
            .map(|(_, name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl TrackingService for MockTracking {
    async fn create_version(&self, request: &NewVersion) -> Result<VersionRecord> {
        let mut versions = self.versions.lock().unwrap();
        let record = VersionRecord {
            id: format!("new-version-{}", versions.len() + 1),
            asset_name: request.asset_name.clone(),
            asset_type: request.asset_type.clone(),
            version: versions.len() as u32 + 1,
            task_id: request.task_id.clone(),
        };
        versions.push((request.clone(), record.clone()));
        Ok(record)
    }

    async fn get_version(&self, version_id: &str) -> Result<Option<VersionRecord>> {
        Ok(self.existing_versions.lock().unwrap().get(version_id).cloned())
    }

    async fn uses_versions(&self, version_id: &str) -> Result<Vec<String>> {
        Ok(self
            .uses
            .lock()
            .unwrap()
            .get(version_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_uses_versions(&self, version_id: &str, used: &[String]) -> Result<()> {
        self.uses
            .lock()
            .unwrap()
            .entry(version_id.to_string())
            .or_default()
            .extend(used.iter().cloned());
        Ok(())
    }

    async fn components(&self, version_id: &str) -> Result<Vec<ComponentRecord>> {
        Ok(self
            .existing_components
            .lock()
            .unwrap()
            .get(version_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_component(
        &self,
        version_id: &str,
        name: &str,
        path: &str,
    ) -> Result<ComponentRecord> {
        if self.failing_components.lock().unwrap().iter().any(|n| n == name) {
            return Err(FcuError::tracking(format!("cannot create {}", name)));
        }
        self.created_components.lock().unwrap().push((
            version_id.to_string(),
            name.to_string(),
            path.to_string(),
        ));
        Ok(ComponentRecord {
            id: format!("component-{}", name),
            name: name.to_string(),
            path: Some(path.to_string()),
        })
    }

    async fn make_reviewable(&self, version_id: &str, path: &str) -> Result<()> {
        self.reviewables
            .lock()
            .unwrap()
            .push((version_id.to_string(), path.to_string()));
        Ok(())
    }

    async fn publish_version(&self, version_id: &str) -> Result<()> {
        self.published.lock().unwrap().push(version_id.to_string());
        Ok(())
    }

    async fn get_task(&self, task_id: &str) -> Result<Option<TaskRecord>> {
        Ok(self.tasks.lock().unwrap().get(task_id).cloned())
    }

    async fn task_statuses(&self) -> Result<Vec<StatusRecord>> {
        Ok(self.statuses.lock().unwrap().clone())
    }

    async fn set_task_status(&self, task_id: &str, status_id: &str) -> Result<()> {
        if self.fail_status_update.load(Ordering::SeqCst) {
            return Err(FcuError::tracking("status update rejected"));
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((task_id.to_string(), status_id.to_string()));
        Ok(())
    }

    async fn shot_fps(&self, shot_id: &str) -> Result<Option<f64>> {
        Ok(self.shot_fps.lock().unwrap().get(shot_id).copied())
    }
}
