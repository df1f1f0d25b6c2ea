use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;
use uuid::Uuid;

use super::transport::Connection;

/// One live connection between the client process and the editor.
///
/// Created by the Connection Keeper after a successful connect and dropped
/// when the server goes away or asks us to reconnect.
pub struct Session {
    pub id: Uuid,
    pub connected_at: DateTime<Utc>,
    connection: Arc<dyn Connection>,
    alive: bool,
    last_heartbeat: Option<Instant>,
}

impl Session {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            connection,
            alive: true,
            last_heartbeat: None,
        }
    }

    pub fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    /// Alive until marked dead or the channel reports itself closed.
    pub fn is_alive(&self) -> bool {
        self.alive && !self.connection.is_closed()
    }

    pub fn mark_dead(&mut self) {
        self.alive = false;
    }

    pub fn last_heartbeat(&self) -> Option<Instant> {
        self.last_heartbeat
    }

    pub fn record_heartbeat(&mut self, at: Instant) {
        self.last_heartbeat = Some(at);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("connected_at", &self.connected_at)
            .field("alive", &self.alive)
            .field("last_heartbeat", &self.last_heartbeat)
            .finish()
    }
}
