//! Application layer of the bridge: the session, the registries and the
//! publish flow, wired together by [`ClientContext`].
//!
//! # Module Structure
//!
//! - `connection`: the Connection Keeper
//! - `gateway`: outbound calls, inbound decoding and the main-thread queue
//! - `dialogs`: the Dialog Session Registry
//! - `adapters`: the Asset Adapter Registry and the built-in adapters
//! - `managed_assets`: tracking-managed assets in the editor project
//! - `publish`: the Publish Orchestrator
//! - `client`: the client session context and main loop

pub mod adapters;
pub mod client;
pub mod connection;
pub mod dialogs;
pub mod gateway;
pub mod managed_assets;
pub mod publish;

#[cfg(test)]
mod test_support;

pub use adapters::{AdapterRegistry, AssetAdapter};
pub use client::{CLIENT_NAME, ClientContext, ClientDeps, RecorderSettings};
pub use connection::{ConnectionKeeper, ShutdownDecision};
pub use dialogs::{DialogRegistry, OrchestratorBuilder};
pub use gateway::{InboundCall, Job, MainThreadQueue, RemoteEditor, RemoteGateway};
pub use managed_assets::{ManagedAsset, ManagedAssets};
pub use publish::{PublishOrchestrator, PublishServices, PublishSummary};
