//! Unified error type for the Quizhall server.

use quizhall_access::AccessError;
use quizhall_game::GameError;
use quizhall_protocol::ProtocolError;
use quizhall_store::StoreError;
use quizhall_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// Only transport and setup failures end a connection. Everything a client
/// can cause is turned into a [`GameError`] and answered with
/// `server:error`.
#[derive(Debug, thiserror::Error)]
pub enum QuizhallError {
    /// Binding, accepting, reading or writing failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Credential or registry failure.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Quiz catalog or session store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An engine operation failed.
    #[error(transparent)]
    Game(#[from] GameError),
}

#[cfg(test)]
mod tests {
    use quizhall_protocol::QuizId;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: QuizhallError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, QuizhallError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_access_error() {
        let err: QuizhallError = AccessError::Expired.into();
        assert!(matches!(err, QuizhallError::Access(_)));
    }

    #[test]
    fn test_from_store_error() {
        let err: QuizhallError = StoreError::QuizNotFound(QuizId::from("q")).into();
        assert!(matches!(err, QuizhallError::Store(_)));
    }

    #[test]
    fn test_from_game_error_is_transparent() {
        let err: QuizhallError = GameError::Conflict("name already taken".into()).into();
        assert_eq!(err.to_string(), "name already taken");
    }
}
