//! Line-delimited JSON frames exchanged with the editor.
//!
//! One JSON object per line, tagged by `type`. Call arguments travel as a
//! single JSON-encoded string in `payload`.

use fcu_core::session::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// First frame sent by the client.
    Hello { client: String },
    /// Server acknowledgement of `Hello`.
    Welcome,
    /// Request that expects a `Reply` with the same id.
    Call {
        id: u64,
        method: String,
        payload: String,
    },
    /// Fire-and-forget request.
    Notify { method: String, payload: String },
    Reply {
        id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Keep-alive. Never answered.
    Ping,
}

impl Frame {
    pub fn reply(id: u64, result: Result<Value, String>) -> Self {
        match result {
            Ok(value) => Frame::Reply {
                id,
                result: Some(value),
                error: None,
            },
            Err(message) => Frame::Reply {
                id,
                result: None,
                error: Some(message),
            },
        }
    }

    pub fn encode(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Protocol(e.to_string()))
    }

    pub fn decode(line: &str) -> Result<Self, TransportError> {
        serde_json::from_str(line.trim())
            .map_err(|e| TransportError::Protocol(format!("{}: {}", e, line.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_wire_shape() {
        let frame = Frame::Call {
            id: 7,
            method: "publish".to_string(),
            payload: r#"{"asset_type":"img"}"#.to_string(),
        };
        let value: Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "call", "id": 7, "method": "publish", "payload": "{\"asset_type\":\"img\"}"})
        );
    }

    #[test]
    fn test_error_reply_omits_result() {
        let encoded = Frame::reply(3, Err("boom".to_string())).encode().unwrap();
        assert_eq!(encoded, r#"{"type":"reply","id":3,"error":"boom"}"#);
    }

    #[test]
    fn test_decode_unit_frames() {
        assert_eq!(Frame::decode(r#"{"type":"ping"}"#).unwrap(), Frame::Ping);
        assert_eq!(Frame::decode("{\"type\":\"welcome\"}\r\n").unwrap(), Frame::Welcome);
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let err = Frame::decode(r#"{"type":"shout"}"#).unwrap_err();
        assert!(matches!(err, TransportError::Protocol(_)));
    }
}
