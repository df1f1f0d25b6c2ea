//! Dialog Session Registry.
//!
//! Opens dialogs on request from the editor and tracks the live ones. Every
//! `show` opens a new instance. The newest publish dialog, together with its
//! orchestrator, sits in a single slot that receives the server's publish
//! callbacks.

use fcu_core::dialog::{DialogFactory, DialogHandle, DialogKind, DialogWindow, PublishView};
use fcu_core::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::publish::PublishOrchestrator;

/// Builds the orchestrator that drives a freshly opened publish dialog.
pub type OrchestratorBuilder =
    Arc<dyn Fn(Arc<dyn PublishView>) -> PublishOrchestrator + Send + Sync>;

enum OpenDialog {
    Window(Arc<dyn DialogWindow>),
    Publish(Arc<dyn PublishView>),
}

impl OpenDialog {
    fn close(&self) {
        match self {
            OpenDialog::Window(window) => window.close(),
            OpenDialog::Publish(view) => view.close(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            OpenDialog::Window(window) => window.is_closed(),
            OpenDialog::Publish(view) => view.is_closed(),
        }
    }
}

struct PublishSlot {
    handle: DialogHandle,
    orchestrator: Arc<PublishOrchestrator>,
}

pub struct DialogRegistry {
    factory: Arc<dyn DialogFactory>,
    build_orchestrator: OrchestratorBuilder,
    next_handle: AtomicU64,
    open: Mutex<BTreeMap<DialogHandle, (DialogKind, OpenDialog)>>,
    publish_slot: Mutex<Option<PublishSlot>>,
}

impl DialogRegistry {
    pub fn new(factory: Arc<dyn DialogFactory>, build_orchestrator: OrchestratorBuilder) -> Self {
        Self {
            factory,
            build_orchestrator,
            next_handle: AtomicU64::new(1),
            open: Mutex::new(BTreeMap::new()),
            publish_slot: Mutex::new(None),
        }
    }

    /// Opens and shows a new dialog of `kind`.
    ///
    /// A publish dialog replaces whatever was in the publish slot; the
    /// replaced dialog stays open but no longer receives callbacks.
    ///
    /// # Errors
    ///
    /// Whatever the dialog factory fails with.
    pub async fn show(&self, kind: DialogKind) -> Result<DialogHandle> {
        self.prune_closed().await;
        let handle = DialogHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));

        let dialog = match kind {
            DialogKind::Publish => {
                let view = self.factory.open_publish()?;
                let orchestrator = Arc::new((self.build_orchestrator)(view.clone()));
                view.show();

                let previous = self.publish_slot.lock().await.replace(PublishSlot {
                    handle,
                    orchestrator,
                });
                if let Some(previous) = previous {
                    tracing::debug!(
                        "[Dialogs] Publish dialog {:?} replaced by {:?}",
                        previous.handle,
                        handle
                    );
                }
                OpenDialog::Publish(view)
            }
            _ => {
                let window = self.factory.open(kind)?;
                window.show();
                OpenDialog::Window(window)
            }
        };

        self.open.lock().await.insert(handle, (kind, dialog));
        tracing::info!("[Dialogs] Opened '{}' as {:?}", kind, handle);
        Ok(handle)
    }

    /// Opens a dialog by its wire name, e.g. `"Import asset"`.
    ///
    /// # Errors
    ///
    /// `FcuError::UnknownDialogKind` for names outside the four dialogs.
    pub async fn show_named(&self, name: &str) -> Result<DialogHandle> {
        let kind = DialogKind::from_name(name).inspect_err(|_| {
            tracing::warn!("[Dialogs] Unknown dialog '{}'", name);
        })?;
        self.show(kind).await
    }

    /// Forgets a closed dialog.
    ///
    /// # Returns
    ///
    /// `false` when `handle` was not open.
    pub async fn on_closed(&self, handle: DialogHandle) -> bool {
        let removed = self.open.lock().await.remove(&handle);
        let Some((kind, _)) = removed else {
            return false;
        };

        let mut slot = self.publish_slot.lock().await;
        if slot.as_ref().is_some_and(|s| s.handle == handle) {
            *slot = None;
            tracing::debug!("[Dialogs] Publish slot emptied");
        }
        tracing::info!("[Dialogs] Closed '{}' ({:?})", kind, handle);
        true
    }

    /// Forgets every dialog whose window reports it was closed.
    ///
    /// # Returns
    ///
    /// How many dialogs were forgotten.
    pub async fn prune_closed(&self) -> usize {
        let closed: Vec<DialogHandle> = self
            .open
            .lock()
            .await
            .iter()
            .filter(|(_, (_, dialog))| dialog.is_closed())
            .map(|(handle, _)| *handle)
            .collect();

        for handle in &closed {
            self.on_closed(*handle).await;
        }
        closed.len()
    }

    /// Orchestrator of the publish dialog `handle`, while it holds the slot.
    pub async fn orchestrator_of(&self, handle: DialogHandle) -> Option<Arc<PublishOrchestrator>> {
        self.publish_slot
            .lock()
            .await
            .as_ref()
            .filter(|slot| slot.handle == handle)
            .map(|slot| slot.orchestrator.clone())
    }

    /// Orchestrator of the newest open publish dialog.
    pub async fn publish_orchestrator(&self) -> Option<Arc<PublishOrchestrator>> {
        self.publish_slot
            .lock()
            .await
            .as_ref()
            .map(|slot| slot.orchestrator.clone())
    }

    pub async fn open_count(&self) -> usize {
        self.open.lock().await.len()
    }

    /// Kinds of the open dialogs, in opening order.
    pub async fn open_kinds(&self) -> Vec<DialogKind> {
        self.open.lock().await.values().map(|(kind, _)| *kind).collect()
    }

    /// Closes every open dialog, e.g. when the session ends.
    pub async fn close_all(&self) {
        let open = std::mem::take(&mut *self.open.lock().await);
        for (_, dialog) in open.values() {
            dialog.close();
        }
        *self.publish_slot.lock().await = None;
        if !open.is_empty() {
            tracing::info!("[Dialogs] Closed {} dialog(s)", open.len());
        }
    }
}
