use async_trait::async_trait;
use fcu_core::Result;
use fcu_core::asset::{EngineEditor, ImporterRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::outbound::{RemoteGateway, server_methods};

/// Editor surface for a live session.
///
/// Project files are handled locally by `local`; everything that needs the
/// running editor (asset database refresh, selection, console output) is
/// forwarded to the server as async calls.
pub struct RemoteEditor {
    local: Arc<dyn EngineEditor>,
    gateway: RemoteGateway,
}

impl RemoteEditor {
    pub fn new(local: Arc<dyn EngineEditor>, gateway: RemoteGateway) -> Self {
        Self { local, gateway }
    }
}

#[async_trait]
impl EngineEditor for RemoteEditor {
    fn asset_root(&self) -> PathBuf {
        self.local.asset_root()
    }

    async fn refresh(&self) -> Result<()> {
        self.local.refresh().await?;
        self.gateway
            .call_async(server_methods::REFRESH_ASSETS, &())
            .await
    }

    async fn find_assets(&self) -> Result<Vec<String>> {
        self.local.find_assets().await
    }

    async fn guid_to_path(&self, guid: &str) -> Result<Option<PathBuf>> {
        self.local.guid_to_path(guid).await
    }

    async fn path_to_guid(&self, path: &Path) -> Result<Option<String>> {
        self.local.path_to_guid(path).await
    }

    async fn importer(&self, path: &Path) -> Result<Option<ImporterRecord>> {
        self.local.importer(path).await
    }

    async fn write_importer(&self, path: &Path, record: &ImporterRecord) -> Result<()> {
        self.local.write_importer(path, record).await
    }

    async fn selected_guids(&self) -> Result<Vec<String>> {
        self.local.selected_guids().await
    }

    async fn select(&self, guids: &[String]) -> Result<()> {
        self.local.select(guids).await?;
        self.gateway
            .call_async(server_methods::SELECT_OBJECTS, guids)
            .await
    }

    async fn delete_asset(&self, path: &Path) -> Result<()> {
        self.local.delete_asset(path).await?;
        self.refresh().await
    }

    async fn log_error(&self, message: &str) {
        self.local.log_error(message).await;
        if let Err(e) = self
            .gateway
            .call_async(server_methods::LOG_ERROR, message)
            .await
        {
            tracing::debug!("[Editor] Could not mirror error to the editor console: {}", e);
        }
    }
}
