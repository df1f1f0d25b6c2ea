use async_trait::async_trait;
use fcu_core::asset::{
    ImportRequest, ImportedAsset, ObjectRef, OptionSpec, PublishRequest, PublishedComponent,
};
use fcu_core::publish::RenderedArtifacts;
use fcu_core::{FcuError, Result};

use super::{AssetAdapter, IMAGE_ASSET_TYPE, map_artifacts};

/// Image sequences recorded in the editor. Publish only.
#[derive(Debug, Default)]
pub struct ImageSequenceAdapter;

impl ImageSequenceAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetAdapter for ImageSequenceAdapter {
    fn asset_type(&self) -> &str {
        IMAGE_ASSET_TYPE
    }

    async fn import_asset(&self, _request: &ImportRequest) -> Result<ImportedAsset> {
        Err(FcuError::invalid_asset("image sequences cannot be imported"))
    }

    async fn change_version(
        &self,
        _request: &ImportRequest,
        _existing: &ObjectRef,
    ) -> Result<ImportedAsset> {
        Err(FcuError::invalid_asset("image sequences cannot be imported"))
    }

    /// Packages are never part of an image publish.
    fn publish_asset(
        &self,
        artifacts: &RenderedArtifacts,
        request: &PublishRequest,
    ) -> Result<Vec<PublishedComponent>> {
        let artifacts = RenderedArtifacts {
            package_path: None,
            ..artifacts.clone()
        };
        map_artifacts(&artifacts, request)
    }

    fn import_options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    fn export_options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::flag("image_sequence", "Record image sequence", true),
            OptionSpec::flag("reviewable", "Record reviewable", true),
        ]
    }
}
