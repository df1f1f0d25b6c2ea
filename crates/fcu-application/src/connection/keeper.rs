//! Connection Keeper: owns the single session to the editor process.

use fcu_core::config::ConnectionConfig;
use fcu_core::session::{Connection, InboundSender, Session, Transport, TransportError};
use fcu_core::{FcuError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// What the client should do after the server announced its shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownDecision {
    /// The server restarts (domain reload): connect again from the main loop.
    Reconnect,
    /// The server is going away for good: leave the client loop.
    Quit,
}

/// Establishes, keeps alive and tears down the session.
///
/// At most one [`Session`] exists at a time; a successful `connect`
/// replaces (and closes) any previous one.
pub struct ConnectionKeeper {
    transport: Arc<dyn Transport>,
    config: ConnectionConfig,
    inbound: InboundSender,
    session: Mutex<Option<Session>>,
}

impl ConnectionKeeper {
    /// Creates a keeper.
    ///
    /// # Arguments
    ///
    /// * `transport` - Factory for connections to the editor
    /// * `config` - Retry, heartbeat and timeout settings
    /// * `inbound` - Where server-initiated calls are delivered
    pub fn new(
        transport: Arc<dyn Transport>,
        config: ConnectionConfig,
        inbound: InboundSender,
    ) -> Self {
        Self {
            transport,
            config,
            inbound,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Connects to the server, retrying while it is not listening yet.
    ///
    /// `retry_delay` is slept before every attempt, the first one included,
    /// which gives a freshly started editor time to open its endpoint.
    ///
    /// # Returns
    ///
    /// The id of the new session.
    ///
    /// # Errors
    ///
    /// - `FcuError::ServerGone` when the server closed the stream during an attempt
    /// - `FcuError::Connection` when all `max_attempts` attempts failed, or on
    ///   a non-retryable transport failure
    pub async fn connect(&self) -> Result<Uuid> {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            tokio::time::sleep(self.config.retry_delay()).await;

            match self.transport.connect(self.inbound.clone()).await {
                Ok(connection) => {
                    let session = Session::new(connection);
                    let id = session.id;
                    tracing::info!(
                        session_id = %id,
                        attempt,
                        "[Keeper] Connected to {}",
                        self.config.address()
                    );

                    let previous = self.session.lock().await.replace(session);
                    if let Some(previous) = previous {
                        previous.connection().close().await;
                    }
                    return Ok(id);
                }
                Err(TransportError::EndOfStream) => {
                    tracing::info!("[Keeper] Server closed the channel while connecting");
                    return Err(FcuError::ServerGone(
                        "end of stream while connecting".to_string(),
                    ));
                }
                Err(e) if e.is_retryable() => {
                    tracing::debug!(attempt, max_attempts, "[Keeper] Connect attempt failed: {}", e);
                }
                Err(e) => {
                    tracing::error!(attempt, "[Keeper] Connect failed: {}", e);
                    return Err(FcuError::connection(e.to_string()));
                }
            }
        }

        tracing::error!(
            max_attempts,
            "[Keeper] Giving up on {}",
            self.config.address()
        );
        Err(FcuError::connection("could not connect"))
    }

    /// The live connection.
    ///
    /// # Errors
    ///
    /// `FcuError::Connection` when there is no live session.
    pub async fn connection(&self) -> Result<Arc<dyn Connection>> {
        let guard = self.session.lock().await;
        match guard.as_ref() {
            Some(session) if session.is_alive() => Ok(session.connection()),
            _ => Err(FcuError::connection("not connected")),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(Session::is_alive)
    }

    pub async fn session_id(&self) -> Option<Uuid> {
        self.session.lock().await.as_ref().map(|s| s.id)
    }

    /// Sends a keep-alive ping unless one went out less than
    /// `heartbeat_interval` ago. The first heartbeat of a session is sent
    /// immediately.
    ///
    /// Ping failures are logged and swallowed.
    ///
    /// # Returns
    ///
    /// Whether a ping was sent.
    pub async fn heartbeat(&self) -> bool {
        let connection = {
            let mut guard = self.session.lock().await;
            let Some(session) = guard.as_mut() else {
                return false;
            };

            let now = Instant::now();
            if let Some(last) = session.last_heartbeat() {
                if now.duration_since(last) < self.config.heartbeat_interval() {
                    return false;
                }
            }
            session.record_heartbeat(now);
            session.connection()
        };

        if let Err(e) = connection.ping().await {
            tracing::debug!("[Keeper] Heartbeat failed: {}", e);
        }
        true
    }

    /// Handles the server's shutdown notice.
    ///
    /// With `should_retry` the session is closed right away and the caller
    /// is told to reconnect; otherwise the caller is told to quit.
    pub async fn on_server_shutdown(&self, should_retry: bool) -> ShutdownDecision {
        if should_retry {
            tracing::info!("[Keeper] Server restarting, dropping session");
            self.close().await;
            ShutdownDecision::Reconnect
        } else {
            tracing::info!("[Keeper] Server shutting down");
            ShutdownDecision::Quit
        }
    }

    /// Closes and forgets the current session, if any.
    pub async fn close(&self) {
        let session = self.session.lock().await.take();
        if let Some(mut session) = session {
            session.mark_dead();
            session.connection().close().await;
            tracing::debug!(session_id = %session.id, "[Keeper] Session closed");
        }
    }
}
