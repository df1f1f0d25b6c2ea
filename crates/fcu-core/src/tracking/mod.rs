//! Tracking-service seam and the records that cross it.

mod model;
mod service;

pub use model::{ComponentRecord, NewVersion, StatusRecord, TaskRecord, VersionRecord};
pub use service::TrackingService;
