//! Publish domain module.

mod model;

pub use model::{
    PendingPublish, PublishCommand, PublishForm, PublishResult, PublishStage, RenderedArtifacts,
};
