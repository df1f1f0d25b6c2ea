//! Lookup of tracking-managed assets in the editor project.
//!
//! An asset is managed when its importer user data holds an
//! [`AssetMetadata`] record.

use fcu_core::Result;
use fcu_core::asset::{AssetMetadata, EngineEditor};
use fcu_core::tracking::{TrackingService, VersionRecord};
use futures::future::join_all;
use std::sync::Arc;

/// A managed asset: its editor guid and the metadata it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedAsset {
    pub guid: String,
    pub metadata: AssetMetadata,
}

impl ManagedAsset {
    pub fn component_id(&self) -> &str {
        &self.metadata.component_id
    }
}

pub struct ManagedAssets {
    editor: Arc<dyn EngineEditor>,
    tracking: Arc<dyn TrackingService>,
}

impl ManagedAssets {
    pub fn new(editor: Arc<dyn EngineEditor>, tracking: Arc<dyn TrackingService>) -> Self {
        Self { editor, tracking }
    }

    /// Metadata of the asset behind `guid`, if it is managed.
    pub async fn metadata(&self, guid: &str) -> Result<Option<AssetMetadata>> {
        let Some(path) = self.editor.guid_to_path(guid).await? else {
            return Ok(None);
        };
        Ok(self
            .editor
            .importer(&path)
            .await?
            .and_then(|record| AssetMetadata::from_user_data(&record.user_data)))
    }

    /// Every managed model asset in the project.
    pub async fn list(&self) -> Result<Vec<ManagedAsset>> {
        let guids = self.editor.find_assets().await?;
        let lookups = join_all(guids.iter().map(|guid| self.metadata(guid))).await;

        let mut assets = Vec::new();
        for (guid, metadata) in guids.into_iter().zip(lookups) {
            if let Some(metadata) = metadata? {
                assets.push(ManagedAsset { guid, metadata });
            }
        }
        Ok(assets)
    }

    /// The version behind the managed asset named `asset_name` of type
    /// `asset_type` that was published from `task_id`.
    pub async fn find_version(
        &self,
        asset_name: &str,
        asset_type: &str,
        task_id: Option<&str>,
    ) -> Result<Option<VersionRecord>> {
        for asset in self.list().await? {
            if asset.metadata.asset_name != asset_name || asset.metadata.asset_type != asset_type {
                continue;
            }
            let version = self
                .tracking
                .get_version(&asset.metadata.asset_version_id)
                .await?;
            if let Some(version) = version {
                if version.task_id.as_deref() == task_id {
                    return Ok(Some(version));
                }
            }
        }
        Ok(None)
    }

    /// Guids of managed assets in the current selection.
    pub async fn selected(&self) -> Result<Vec<String>> {
        let mut guids = self.editor.selected_guids().await?;
        guids.sort();
        guids.dedup();

        let mut managed = Vec::new();
        for guid in guids {
            if self.metadata(&guid).await?.is_some() {
                managed.push(guid);
            }
        }
        Ok(managed)
    }

    /// Selects `guids` in the editor. An empty list leaves the selection alone.
    pub async fn select_objects(&self, guids: &[String]) -> Result<()> {
        if guids.is_empty() {
            return Ok(());
        }
        self.editor.select(guids).await
    }

    /// Deletes the asset behind `guid`.
    ///
    /// # Returns
    ///
    /// `false` when the guid does not resolve to an asset.
    pub async fn remove_object(&self, guid: &str) -> Result<bool> {
        let Some(path) = self.editor.guid_to_path(guid).await? else {
            return Ok(false);
        };
        self.editor.delete_asset(&path).await?;
        tracing::info!("[Assets] Removed {}", guid);
        Ok(true)
    }
}
