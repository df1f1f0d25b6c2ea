use fcu_core::asset::{
    EngineEditor, ImportRequest, ImportedAsset, ObjectRef, OptionSpec, PublishRequest,
    PublishedComponent,
};
use fcu_core::publish::RenderedArtifacts;
use fcu_core::{FcuError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{AssetAdapter, ImageSequenceAdapter, ModelAdapter};

/// Message returned with an empty mapping for unknown asset types.
pub const UNSUPPORTED_MESSAGE: &str = "assetType not supported";

/// Components produced for a publish, with an explanation when there are none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishMapping {
    pub components: Vec<PublishedComponent>,
    pub message: Option<String>,
}

/// Maps asset type tags to adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn AssetAdapter>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `geo`, `rig`, `anim` and `img`.
    pub fn register_builtin(&self, editor: Arc<dyn EngineEditor>) {
        let adapters: [Arc<dyn AssetAdapter>; 4] = [
            Arc::new(ModelAdapter::geometry(editor.clone())),
            Arc::new(ModelAdapter::rig(editor.clone())),
            Arc::new(ModelAdapter::animation(editor)),
            Arc::new(ImageSequenceAdapter::new()),
        ];
        for adapter in adapters {
            let tag = adapter.asset_type().to_string();
            self.register(tag, adapter);
        }
    }

    /// Registers `adapter` under `tag`. A later registration for the same
    /// tag replaces the earlier one, which is returned.
    pub fn register(
        &self,
        tag: impl Into<String>,
        adapter: Arc<dyn AssetAdapter>,
    ) -> Option<Arc<dyn AssetAdapter>> {
        let tag = tag.into();
        let mut adapters = match self.adapters.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let previous = adapters.insert(tag.clone(), adapter);
        if previous.is_some() {
            tracing::debug!("[Adapters] Replaced adapter for '{}'", tag);
        }
        previous
    }

    /// # Errors
    ///
    /// `FcuError::UnsupportedAssetType` when nothing is registered for `tag`.
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn AssetAdapter>> {
        let adapters = match self.adapters.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        adapters
            .get(tag)
            .cloned()
            .ok_or_else(|| FcuError::UnsupportedAssetType(tag.to_string()))
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let adapters = match self.adapters.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut tags: Vec<String> = adapters.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub async fn import_asset(&self, request: &ImportRequest) -> Result<ImportedAsset> {
        self.resolve(&request.asset_type)?
            .import_asset(request)
            .await
    }

    pub async fn change_version(
        &self,
        request: &ImportRequest,
        existing: &ObjectRef,
    ) -> Result<ImportedAsset> {
        self.resolve(&request.asset_type)?
            .change_version(request, existing)
            .await
    }

    /// Maps artifacts through the adapter for `request.asset_type`.
    ///
    /// An unknown asset type is not an error here: the mapping comes back
    /// empty with [`UNSUPPORTED_MESSAGE`].
    ///
    /// # Errors
    ///
    /// Whatever the adapter's own mapping fails with.
    pub fn publish_asset(
        &self,
        artifacts: &RenderedArtifacts,
        request: &PublishRequest,
    ) -> Result<PublishMapping> {
        let adapter = match self.resolve(&request.asset_type) {
            Ok(adapter) => adapter,
            Err(_) => {
                tracing::warn!(
                    "[Adapters] Asset type '{}' not supported for publish",
                    request.asset_type
                );
                return Ok(PublishMapping {
                    components: Vec::new(),
                    message: Some(UNSUPPORTED_MESSAGE.to_string()),
                });
            }
        };

        Ok(PublishMapping {
            components: adapter.publish_asset(artifacts, request)?,
            message: None,
        })
    }

    pub fn import_options(&self, tag: &str) -> Result<Vec<OptionSpec>> {
        Ok(self.resolve(tag)?.import_options())
    }

    pub fn export_options(&self, tag: &str) -> Result<Vec<OptionSpec>> {
        Ok(self.resolve(tag)?.export_options())
    }
}
