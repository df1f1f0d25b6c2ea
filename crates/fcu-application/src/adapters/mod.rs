//! Asset adapters: per-asset-type import, version change and publish.
//!
//! # Module Structure
//!
//! - `registry`: tag → adapter lookup and routing (`AdapterRegistry`)
//! - `model`: the model adapters (`geo`, `rig`, `anim`)
//! - `image`: the publish-only image-sequence adapter (`img`)
//! - `sequence`: frame-pattern normalization
//! - `validation`: source and destination checks

mod image;
mod model;
mod registry;
mod sequence;
mod validation;

pub use image::ImageSequenceAdapter;
pub use model::ModelAdapter;
pub use registry::{AdapterRegistry, PublishMapping, UNSUPPORTED_MESSAGE};
pub use sequence::{normalize_frame_pattern, sequence_path};
pub use validation::{MODEL_IMPORT_EXTENSIONS, contained_destination, validate_source};

use async_trait::async_trait;
use fcu_core::asset::{
    AssetMetadata, INTEGRATION_VERSION, ImportRequest, ImportedAsset, ObjectRef, OptionSpec,
    PublishRequest, PublishedComponent,
};
use fcu_core::publish::RenderedArtifacts;
use fcu_core::{FcuError, Result};

pub const GEOMETRY_ASSET_TYPE: &str = "geo";
pub const RIG_ASSET_TYPE: &str = "rig";
pub const ANIMATION_ASSET_TYPE: &str = "anim";
pub const IMAGE_ASSET_TYPE: &str = "img";

pub const REVIEWABLE_COMPONENT: &str = "reviewable";
pub const IMAGE_SEQUENCE_COMPONENT: &str = "image_sequence";
pub const PACKAGE_COMPONENT: &str = "package";

/// Behavior of one asset type.
#[async_trait]
pub trait AssetAdapter: Send + Sync {
    /// The tag this adapter is registered under by default.
    fn asset_type(&self) -> &str;

    /// Brings a component file into the project.
    ///
    /// # Errors
    ///
    /// - `FcuError::InvalidAsset` when the source or destination is unusable
    /// - `FcuError::OutOfBoundsDestination` when the destination leaves the asset root
    async fn import_asset(&self, request: &ImportRequest) -> Result<ImportedAsset>;

    /// Replaces the file behind `existing` with the requested version.
    async fn change_version(
        &self,
        request: &ImportRequest,
        existing: &ObjectRef,
    ) -> Result<ImportedAsset>;

    /// Maps rendered artifacts to the components of a new version.
    fn publish_asset(
        &self,
        artifacts: &RenderedArtifacts,
        request: &PublishRequest,
    ) -> Result<Vec<PublishedComponent>>;

    fn import_options(&self) -> Vec<OptionSpec>;

    fn export_options(&self) -> Vec<OptionSpec>;
}

/// Metadata record written next to an imported file.
pub fn metadata_for(request: &ImportRequest) -> AssetMetadata {
    AssetMetadata {
        asset_name: request.asset_name.clone(),
        asset_type: request.asset_type.clone(),
        asset_version_id: request.asset_version_id.clone(),
        asset_version: request.asset_version,
        component_id: request.component_id.clone(),
        component_name: request.component_name.clone(),
        integration_version: INTEGRATION_VERSION.to_string(),
    }
}

/// Standard artifact mapping: movie → `reviewable`, frames →
/// `image_sequence`, package → `package`.
///
/// # Errors
///
/// `FcuError::InvalidAsset` when frames were rendered but the request has
/// no frame range.
pub fn map_artifacts(
    artifacts: &RenderedArtifacts,
    request: &PublishRequest,
) -> Result<Vec<PublishedComponent>> {
    let mut components = Vec::new();

    if let Some(movie) = &artifacts.movie_path {
        components.push(PublishedComponent::new(REVIEWABLE_COMPONENT, movie));
    }

    if let Some(template) = &artifacts.image_path {
        let (Some(start), Some(end)) = (request.frame_start, request.frame_end) else {
            return Err(FcuError::invalid_asset(
                "an image sequence needs a frame range (FS/FE)",
            ));
        };
        components.push(PublishedComponent::new(
            IMAGE_SEQUENCE_COMPONENT,
            sequence_path(template, start, end),
        ));
    }

    if let Some(package) = &artifacts.package_path {
        components.push(PublishedComponent::new(PACKAGE_COMPONENT, package));
    }

    Ok(components)
}
