//! Error types for the PawEver API client.
//!
//! # Design
//! Callers branch on the variant, never on message text. `Connection` means
//! no response arrived at all; `Http` means the backend answered with a
//! non-2xx status, whether 4xx or 5xx. The `Display` output of both is the
//! message meant for the user.

use thiserror::Error;

/// Message used when a failed response carries no `message` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Failure reported by a `Transport` when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Errors returned by `PawEverClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend could not be reached.
    #[error("{message}")]
    Connection {
        base_url: String,
        message: String,
        #[source]
        source: TransportError,
    },

    /// The backend responded with a status outside 200..=299.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A response envelope could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    Decode(String),
}

impl ApiError {
    pub(crate) fn connection(base_url: &str, source: TransportError) -> Self {
        ApiError::Connection {
            base_url: base_url.to_string(),
            message: format!(
                "Unable to reach the PawEver API at {base_url}. \
                 Make sure the backend server is running and reachable."
            ),
            source,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, ApiError::Connection { .. })
    }

    /// HTTP status of an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
