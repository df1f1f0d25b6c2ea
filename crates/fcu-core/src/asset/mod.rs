//! Asset domain module.
//!
//! # Module Structure
//!
//! - `model`: import/publish request and result types
//! - `metadata`: the persisted tracking metadata record (`AssetMetadata`)
//! - `engine`: the editor seam adapters work against (`EngineEditor`)

mod engine;
mod metadata;
mod model;

pub use engine::EngineEditor;
pub use metadata::{AssetMetadata, INTEGRATION_VERSION};
pub use model::{
    ImportRequest, ImportSettings, ImportedAsset, ImporterRecord, ObjectRef, OptionSpec,
    PublishRequest, PublishedComponent,
};
