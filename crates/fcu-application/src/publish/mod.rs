//! Publish flow: form validation, the server render round trip and the
//! tracking-service writes that follow it.

mod orchestrator;

pub use orchestrator::{PublishOrchestrator, PublishServices, PublishSummary};
