//! Error types for the access layer.

use quizhall_protocol::SessionId;
use quizhall_transport::ConnectionId;

/// Errors raised while verifying hosts or tracking connections.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The credential is malformed, has a bad signature, or names no subject.
    #[error("invalid authentication token: {0}")]
    InvalidToken(String),

    /// The credential was valid once but has expired.
    #[error("authentication token expired")]
    Expired,

    /// The connection was never registered (or already disconnected).
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    /// The connection is already registered.
    #[error("connection {0} is already registered")]
    AlreadyConnected(ConnectionId),

    /// The connection is already bound to a session.
    #[error("connection {0} already joined session {1}")]
    AlreadyJoined(ConnectionId, SessionId),
}
