use fcu_core::publish::PublishResult;
use fcu_core::session::InboundRequest;
use fcu_core::{FcuError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Methods the server may invoke on the client.
pub mod client_methods {
    pub const SHOW_DIALOG: &str = "show_dialog";
    pub const PUBLISH: &str = "publish";
    pub const ON_SERVER_SHUTDOWN: &str = "on_server_shutdown";
    pub const CLIENT_NAME: &str = "client_name";
    pub const VERSION: &str = "version";
    pub const LOAD_AND_INIT: &str = "load_and_init";
}

/// A decoded server-to-client call.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundCall {
    /// Open the dialog with this wire name.
    ShowDialog(String),
    /// The server finished (or failed) rendering a publish.
    Publish(PublishResult),
    /// The server is shutting down; `should_retry` when it comes back.
    ServerShutdown { should_retry: bool },
    ClientName,
    Version,
    /// The editor finished loading and wants the client initialized.
    LoadAndInit,
}

impl InboundCall {
    /// Decodes a call from its method name and single JSON payload.
    ///
    /// A payload that is itself a JSON string holding the encoded argument
    /// is accepted too, as is a bare (unquoted) dialog name.
    ///
    /// # Errors
    ///
    /// `FcuError::Remote` for unknown methods and undecodable payloads.
    pub fn dispatch(method: &str, payload: &str) -> Result<Self> {
        use client_methods::*;

        match method {
            SHOW_DIALOG => {
                let name = decode::<String>(method, payload)
                    .unwrap_or_else(|_| payload.trim().to_string());
                Ok(Self::ShowDialog(name))
            }
            PUBLISH => Ok(Self::Publish(decode(method, payload)?)),
            ON_SERVER_SHUTDOWN => Ok(Self::ServerShutdown {
                should_retry: decode(method, payload)?,
            }),
            CLIENT_NAME => Ok(Self::ClientName),
            VERSION => Ok(Self::Version),
            LOAD_AND_INIT => Ok(Self::LoadAndInit),
            other => Err(FcuError::remote(other, "unknown method")),
        }
    }

    pub fn from_request(request: &InboundRequest) -> Result<Self> {
        Self::dispatch(&request.method, &request.payload)
    }

    pub fn method(&self) -> &'static str {
        match self {
            Self::ShowDialog(_) => client_methods::SHOW_DIALOG,
            Self::Publish(_) => client_methods::PUBLISH,
            Self::ServerShutdown { .. } => client_methods::ON_SERVER_SHUTDOWN,
            Self::ClientName => client_methods::CLIENT_NAME,
            Self::Version => client_methods::VERSION,
            Self::LoadAndInit => client_methods::LOAD_AND_INIT,
        }
    }
}

fn decode<T: DeserializeOwned>(method: &str, payload: &str) -> Result<T> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| FcuError::remote(method, format!("invalid payload: {}", e)))?;

    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(e) => match value {
            Value::String(inner) => serde_json::from_str(&inner)
                .map_err(|e| FcuError::remote(method, format!("invalid payload: {}", e))),
            _ => Err(FcuError::remote(method, format!("invalid payload: {}", e))),
        },
    }
}
