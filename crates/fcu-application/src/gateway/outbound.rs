use fcu_core::session::TransportError;
use fcu_core::{FcuError, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::connection::ConnectionKeeper;

/// Methods the client invokes on the server.
pub mod server_methods {
    /// Render the artifacts of a publish; answered through the `publish` callback.
    pub const PUBLISH: &str = "publish";
    pub const APPLY_RECORDER_SETTINGS: &str = "apply_recorder_settings";
    pub const SELECT_OBJECTS: &str = "select_objects";
    pub const REFRESH_ASSETS: &str = "refresh_assets";
    pub const LOG_ERROR: &str = "log_error";
}

/// Outbound side of the Remote Call Gateway.
///
/// Every call carries exactly one argument, serialized to a JSON string.
#[derive(Clone)]
pub struct RemoteGateway {
    keeper: Arc<ConnectionKeeper>,
}

impl RemoteGateway {
    pub fn new(keeper: Arc<ConnectionKeeper>) -> Self {
        Self { keeper }
    }

    pub fn keeper(&self) -> &Arc<ConnectionKeeper> {
        &self.keeper
    }

    /// Calls `name` on the server and waits for its result.
    ///
    /// # Errors
    ///
    /// `FcuError::Remote` when the call failed on the server or could not be
    /// delivered, `FcuError::Connection` when there is no session.
    pub async fn call_sync<A>(&self, name: &str, args: &A) -> Result<Value>
    where
        A: Serialize + ?Sized,
    {
        let payload = encode_args(args)?;
        let connection = self.keeper.connection().await?;
        tracing::debug!(method = name, "[Gateway] Calling server");

        connection
            .call(name, payload)
            .await
            .map_err(|e| remote_error(name, e))
    }

    /// Sends `name` to the server without waiting for it to run.
    ///
    /// Used for slow server work; results, if any, come back later as an
    /// inbound call.
    pub async fn call_async<A>(&self, name: &str, args: &A) -> Result<()>
    where
        A: Serialize + ?Sized,
    {
        let payload = encode_args(args)?;
        let connection = self.keeper.connection().await?;
        tracing::debug!(method = name, "[Gateway] Notifying server");

        connection
            .notify(name, payload)
            .await
            .map_err(|e| remote_error(name, e))
    }

    /// Answers an inbound call that expects a result.
    pub async fn respond(
        &self,
        id: u64,
        result: std::result::Result<Value, String>,
    ) -> Result<()> {
        let connection = self.keeper.connection().await?;
        connection
            .respond(id, result)
            .await
            .map_err(|e| remote_error("reply", e))
    }
}

pub fn encode_args<A>(args: &A) -> Result<String>
where
    A: Serialize + ?Sized,
{
    Ok(serde_json::to_string(args)?)
}

fn remote_error(method: &str, error: TransportError) -> FcuError {
    match error {
        TransportError::Remote(message) => FcuError::remote(method, message),
        other => FcuError::remote(method, other.to_string()),
    }
}
