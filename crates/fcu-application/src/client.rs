//! Client session context and main loop.
//!
//! One `ClientContext` per client process. It owns the session, the
//! registries and the main-thread queue, and is the only place inbound
//! calls are handled.

use fcu_core::asset::{EngineEditor, INTEGRATION_VERSION};
use fcu_core::config::ClientConfig;
use fcu_core::context::LaunchContext;
use fcu_core::dialog::{DialogFactory, DialogHandle, PublishView};
use fcu_core::session::{InboundRequest, Transport};
use fcu_core::tracking::TrackingService;
use fcu_core::Result;
use fcu_infrastructure::menu_script;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::adapters::AdapterRegistry;
use crate::connection::{ConnectionKeeper, ShutdownDecision};
use crate::dialogs::{DialogRegistry, OrchestratorBuilder};
use crate::gateway::{
    InboundCall, Job, MainThreadQueue, RemoteEditor, RemoteGateway, server_methods,
};
use crate::managed_assets::ManagedAssets;
use crate::publish::{PublishOrchestrator, PublishServices};

/// Name the client reports to the server.
pub const CLIENT_NAME: &str = "ftrack-connect-unity";

/// Everything a client context is built from.
pub struct ClientDeps {
    pub transport: Arc<dyn Transport>,
    pub dialog_factory: Arc<dyn DialogFactory>,
    pub tracking: Arc<dyn TrackingService>,
    /// Project-side editor surface; wrapped so editor-side effects reach the server.
    pub editor: Arc<dyn EngineEditor>,
    pub config: ClientConfig,
    pub context: LaunchContext,
}

/// Frame range and rate pushed to the editor's recorder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecorderSettings {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub fps: f64,
}

pub struct ClientContext {
    keeper: Arc<ConnectionKeeper>,
    gateway: RemoteGateway,
    queue: MainThreadQueue,
    dialogs: DialogRegistry,
    adapters: Arc<AdapterRegistry>,
    managed: Arc<ManagedAssets>,
    tracking: Arc<dyn TrackingService>,
    editor: Arc<dyn EngineEditor>,
    config: ClientConfig,
    context: LaunchContext,
    initialized: AtomicBool,
    quit: AtomicBool,
}

impl ClientContext {
    /// Wires the client together. Must be called on the thread that will run
    /// the main loop: that thread owns the job queue.
    pub fn new(deps: ClientDeps) -> Self {
        let queue = MainThreadQueue::new();
        let keeper = Arc::new(ConnectionKeeper::new(
            deps.transport,
            deps.config.connection.clone(),
            queue.inbound_sender(),
        ));
        let gateway = RemoteGateway::new(keeper.clone());
        let editor: Arc<dyn EngineEditor> =
            Arc::new(RemoteEditor::new(deps.editor, gateway.clone()));
        let adapters = Arc::new(AdapterRegistry::new());
        let managed = Arc::new(ManagedAssets::new(editor.clone(), deps.tracking.clone()));

        let services = PublishServices {
            gateway: gateway.clone(),
            tracking: deps.tracking.clone(),
            adapters: adapters.clone(),
            managed: managed.clone(),
            config: deps.config.publish.clone(),
            context: deps.context.clone(),
        };
        let build_orchestrator: OrchestratorBuilder =
            Arc::new(move |view: Arc<dyn PublishView>| {
                PublishOrchestrator::new(view, services.clone())
            });
        let dialogs = DialogRegistry::new(deps.dialog_factory, build_orchestrator);

        Self {
            keeper,
            gateway,
            queue,
            dialogs,
            adapters,
            managed,
            tracking: deps.tracking,
            editor,
            config: deps.config,
            context: deps.context,
            initialized: AtomicBool::new(false),
            quit: AtomicBool::new(false),
        }
    }

    pub fn keeper(&self) -> &Arc<ConnectionKeeper> {
        &self.keeper
    }

    pub fn gateway(&self) -> &RemoteGateway {
        &self.gateway
    }

    pub fn queue(&self) -> &MainThreadQueue {
        &self.queue
    }

    pub fn dialogs(&self) -> &DialogRegistry {
        &self.dialogs
    }

    pub fn adapters(&self) -> &Arc<AdapterRegistry> {
        &self.adapters
    }

    pub fn managed_assets(&self) -> &Arc<ManagedAssets> {
        &self.managed
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_quitting(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    /// Connects to the editor and initializes the client.
    ///
    /// # Errors
    ///
    /// The keeper's error when no session could be established.
    pub async fn start(&self) -> Result<()> {
        self.keeper.connect().await?;
        self.initialize().await;
        Ok(())
    }

    /// Runs the one-time initialization. Later calls do nothing.
    ///
    /// Menu generation and the recorder sync are best effort.
    ///
    /// # Returns
    ///
    /// Whether this call did the initialization.
    pub async fn initialize(&self) -> bool {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("[Client] Already initialized");
            return false;
        }

        self.adapters.register_builtin(self.editor.clone());
        tracing::info!(tags = ?self.adapters.tags(), "[Client] Asset adapters registered");

        if let Err(e) = menu_script::write_menu_files(&self.editor.asset_root()) {
            tracing::warn!("[Client] Could not generate editor menus: {}", e);
        }

        if let Err(e) = self.sync_recorder_settings().await {
            tracing::warn!("[Client] Could not sync recorder settings: {}", e);
        }
        true
    }

    /// Pushes the shot's frame range and frame rate to the editor.
    ///
    /// The frame rate comes from the shot, or the configured default when
    /// the shot has none or cannot be read.
    pub async fn sync_recorder_settings(&self) -> Result<RecorderSettings> {
        let mut fps = None;
        if let Some(shot_id) = self.context.shot_id.as_deref() {
            match self.tracking.shot_fps(shot_id).await {
                Ok(value) => fps = value,
                Err(e) => tracing::warn!("[Client] Could not read fps of shot {}: {}", shot_id, e),
            }
        }

        let settings = RecorderSettings {
            start: self.context.frame_start,
            end: self.context.frame_end,
            fps: fps.unwrap_or(self.config.publish.default_fps),
        };
        self.gateway
            .call_async(server_methods::APPLY_RECORDER_SETTINGS, &settings)
            .await?;
        tracing::debug!(?settings, "[Client] Recorder settings sent");
        Ok(settings)
    }

    /// Handles one inbound call.
    ///
    /// # Returns
    ///
    /// The value to reply with when the server waits for one.
    ///
    /// # Errors
    ///
    /// `FcuError::UnknownDialogKind` for unknown dialog names, or whatever
    /// opening the dialog failed with.
    pub async fn handle(&self, call: InboundCall) -> Result<Value> {
        tracing::debug!(method = call.method(), "[Client] Handling call");

        match call {
            InboundCall::ShowDialog(name) => {
                let handle = self.dialogs.show_named(&name).await?;
                self.submit_prefilled_publish(handle).await?;
                Ok(Value::Null)
            }
            InboundCall::Publish(result) => {
                match self.dialogs.publish_orchestrator().await {
                    Some(orchestrator) => {
                        orchestrator.on_server_result(result).await;
                    }
                    None => tracing::warn!("[Client] Publish result with no publish dialog open"),
                }
                Ok(Value::Null)
            }
            InboundCall::ServerShutdown { should_retry } => {
                match self.keeper.on_server_shutdown(should_retry).await {
                    ShutdownDecision::Reconnect => self.queue.post(Job::Reconnect),
                    ShutdownDecision::Quit => self.request_quit(),
                }
                Ok(Value::Null)
            }
            InboundCall::ClientName => Ok(Value::String(CLIENT_NAME.to_string())),
            InboundCall::Version => Ok(Value::String(INTEGRATION_VERSION.to_string())),
            InboundCall::LoadAndInit => {
                self.initialize().await;
                Ok(Value::Null)
            }
        }
    }

    /// Starts the publish of a freshly opened dialog whose form was filled
    /// in up front.
    async fn submit_prefilled_publish(&self, handle: DialogHandle) -> Result<()> {
        let Some(orchestrator) = self.dialogs.orchestrator_of(handle).await else {
            return Ok(());
        };
        if !orchestrator.view().submits_on_show() {
            return Ok(());
        }
        tracing::info!(?handle, "[Client] Submitting prefilled publish");
        orchestrator.on_publish_clicked().await?;
        Ok(())
    }

    /// Runs one queued job.
    ///
    /// Failing inbound calls are logged (and answered, when the server waits
    /// for a reply); they never end the loop.
    ///
    /// # Errors
    ///
    /// The keeper's error when a reconnect fails.
    pub async fn process(&self, job: Job) -> Result<()> {
        match job {
            Job::Inbound(request) => {
                self.process_inbound(request).await;
                Ok(())
            }
            Job::Reconnect => {
                tracing::info!("[Client] Reconnecting");
                self.keeper.connect().await?;
                Ok(())
            }
        }
    }

    async fn process_inbound(&self, request: InboundRequest) {
        let outcome = match InboundCall::from_request(&request) {
            Ok(call) => self.handle(call).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            tracing::error!(method = %request.method, "[Client] Call failed: {}", e);
        }

        let Some(id) = request.id else {
            return;
        };
        let reply = outcome.map_err(|e| e.to_string());
        if let Err(e) = self.gateway.respond(id, reply).await {
            tracing::warn!(id, "[Client] Could not reply to '{}': {}", request.method, e);
        }
    }

    /// One loop iteration: drain the queue, then heartbeat.
    ///
    /// # Errors
    ///
    /// `FcuError::Internal` off the owner thread, or a failed reconnect.
    pub async fn run_once(&self) -> Result<()> {
        let mut jobs = self.queue.drain()?.into_iter();
        for job in jobs.by_ref() {
            self.process(job).await?;
            if self.is_quitting() {
                self.refuse_remaining(jobs).await;
                return Ok(());
            }
        }
        self.keeper.heartbeat().await;
        Ok(())
    }

    /// Answers the calls still queued when the client quits, so that no
    /// server-side caller is left waiting for a reply.
    async fn refuse_remaining(&self, jobs: impl Iterator<Item = Job>) {
        for job in jobs {
            let Job::Inbound(request) = job else {
                continue;
            };
            tracing::warn!(method = %request.method, "[Client] Dropped: client is shutting down");
            let Some(id) = request.id else {
                continue;
            };
            let reply = Err("client is shutting down".to_string());
            if let Err(e) = self.gateway.respond(id, reply).await {
                tracing::debug!(id, "[Client] Could not refuse '{}': {}", request.method, e);
            }
        }
    }

    /// Runs the main loop until the server leaves for good or a quit is
    /// requested, then closes the dialogs and the session.
    pub async fn run(&self) -> Result<()> {
        let interval = self.config.connection.loop_interval();
        tracing::info!("[Client] Main loop started");

        let outcome = loop {
            if self.is_quitting() {
                break Ok(());
            }
            if let Err(e) = self.run_once().await {
                break Err(e);
            }
            tokio::time::sleep(interval).await;
        };

        self.dialogs.close_all().await;
        self.keeper.close().await;
        match &outcome {
            Ok(()) => tracing::info!("[Client] Main loop finished"),
            Err(e) => tracing::error!("[Client] Main loop stopped: {}", e),
        }
        outcome
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
