//! Remote-call channel abstraction.
//!
//! The bridge never talks to a socket directly: the Connection Keeper asks a
//! [`Transport`] for a [`Connection`] and everything else goes through that
//! handle. Server-initiated calls are pushed into an [`InboundSender`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Failures reported by the remote-call channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Nobody is listening yet (or the endpoint rejected us).
    #[error("Connection refused: {0}")]
    Refused(String),

    /// The peer closed the stream.
    #[error("End of stream")]
    EndOfStream,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Malformed frame or unexpected message.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The peer answered the call with an error.
    #[error("Remote error: {0}")]
    Remote(String),
}

impl TransportError {
    /// Whether a connect attempt failing this way should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Refused(_) | Self::Timeout(_))
    }
}

/// A call the server made into this process.
///
/// `id` is set when the server waits for an answer; the reply goes back
/// through [`Connection::respond`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundRequest {
    pub id: Option<u64>,
    pub method: String,
    /// Single JSON-encoded argument.
    pub payload: String,
}

pub type InboundSender = mpsc::UnboundedSender<InboundRequest>;
pub type InboundReceiver = mpsc::UnboundedReceiver<InboundRequest>;

/// Creates the channel a transport forwards server calls into.
pub fn inbound_channel() -> (InboundSender, InboundReceiver) {
    mpsc::unbounded_channel()
}

/// Factory for connections to the editor process.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a new connection.
    ///
    /// # Arguments
    ///
    /// * `inbound` - Where server-initiated calls are delivered
    ///
    /// # Errors
    ///
    /// - `TransportError::Refused` when the server is not listening yet
    /// - `TransportError::EndOfStream` when the server hung up during the handshake
    async fn connect(&self, inbound: InboundSender) -> Result<Arc<dyn Connection>, TransportError>;
}

/// A live, bidirectional remote-call channel.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Calls `method` and waits for its result.
    async fn call(&self, method: &str, payload: String) -> Result<Value, TransportError>;

    /// Sends `method` without waiting for (or ever observing) a result.
    async fn notify(&self, method: &str, payload: String) -> Result<(), TransportError>;

    /// Answers an inbound request that carried an id.
    async fn respond(
        &self,
        id: u64,
        result: std::result::Result<Value, String>,
    ) -> Result<(), TransportError>;

    /// Sends a keep-alive frame. No answer is expected.
    async fn ping(&self) -> Result<(), TransportError>;

    async fn close(&self);

    fn is_closed(&self) -> bool;
}
