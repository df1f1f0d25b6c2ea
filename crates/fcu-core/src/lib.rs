//! Domain model and trait seams of the tracking-service ⇄ editor bridge.
//!
//! Nothing in this crate performs I/O: transports, the editor surface, the
//! tracking service and the dialogs are traits implemented by the
//! infrastructure and UI layers.

pub mod asset;
pub mod config;
pub mod context;
pub mod dialog;
pub mod error;
pub mod publish;
pub mod session;
pub mod tracking;

// Re-export common error type
pub use error::{FcuError, Result};
