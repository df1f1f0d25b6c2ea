//! Error types for the FCU bridge.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A shared error type for the entire FCU bridge.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FcuError {
    /// Transport-level failure while establishing or using the channel
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server closed the channel while we were connecting
    #[error("Server is gone: {0}")]
    ServerGone(String),

    /// A remote call failed on the other side or could not be delivered
    #[error("Remote call '{method}' failed: {message}")]
    Remote { method: String, message: String },

    /// A dialog name that does not map to any known dialog
    #[error("Unknown dialog kind: '{0}'")]
    UnknownDialogKind(String),

    /// No adapter is registered for the asset type tag
    #[error("Asset type '{0}' is not supported")]
    UnsupportedAssetType(String),

    /// The source file or destination directory failed validation
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// The import destination lies outside the project asset root
    #[error("Destination '{}' is not under the asset root '{}'", destination.display(), root.display())]
    OutOfBoundsDestination { destination: PathBuf, root: PathBuf },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Tracking service request failed
    #[error("Tracking service error: {0}")]
    Tracking(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FcuError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a Remote error for the given method
    pub fn remote(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates an InvalidAsset error
    pub fn invalid_asset(message: impl Into<String>) -> Self {
        Self::InvalidAsset(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Tracking error
    pub fn tracking(message: impl Into<String>) -> Self {
        Self::Tracking(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a transport-level connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::ServerGone(_))
    }

    /// Check if this error comes from input validation and should be shown
    /// to the user rather than treated as a fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAsset(_)
                | Self::UnsupportedAssetType(_)
                | Self::OutOfBoundsDestination { .. }
                | Self::UnknownDialogKind(_)
        )
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FcuError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FcuError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FcuError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FcuError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error, used at the boundary with binaries
impl From<anyhow::Error> for FcuError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, FcuError>`.
pub type Result<T> = std::result::Result<T, FcuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(FcuError::invalid_asset("missing").is_validation());
        assert!(FcuError::UnsupportedAssetType("cam".into()).is_validation());
        assert!(!FcuError::connection("refused").is_validation());
        assert!(FcuError::ServerGone("eof".into()).is_connection());
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = FcuError::OutOfBoundsDestination {
            destination: PathBuf::from("/tmp/elsewhere"),
            root: PathBuf::from("/project/Assets"),
        };
        assert_eq!(
            err.to_string(),
            "Destination '/tmp/elsewhere' is not under the asset root '/project/Assets'"
        );
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FcuError = io.into();
        match err {
            FcuError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
