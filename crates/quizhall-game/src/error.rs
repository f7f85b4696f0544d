//! Error taxonomy for the game layer.
//!
//! Every failed operation ends up here, and every variant maps to the
//! numeric code sent back in `server:error`.

use quizhall_access::AccessError;
use quizhall_protocol::ProtocolError;
use quizhall_store::StoreError;

/// Errors returned by engine operations.
///
/// None of these is fatal to the session: the initiating connection gets a
/// private error and the session's state is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Missing, invalid or expired credential.
    #[error("{0}")]
    Authentication(String),

    /// Authenticated, but not entitled to this action.
    #[error("{0}")]
    Unauthorized(String),

    /// Quiz, session or PIN does not exist (or is not joinable).
    #[error("{0}")]
    NotFound(String),

    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Name collision, locked window, duplicate answer, ended session.
    #[error("{0}")]
    Conflict(String),

    /// PIN allocation gave up.
    #[error("{0}")]
    ResourceExhausted(String),

    /// Storage failure or a broken invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// HTTP-style status code carried in `server:error`.
    pub fn code(&self) -> u16 {
        match self {
            Self::Authentication(_) => 401,
            Self::Unauthorized(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::ResourceExhausted(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// The message shown to the client. Internal details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal error".to_owned(),
            other => other.to_string(),
        }
    }

    pub(crate) fn conflict(msg: &str) -> Self {
        Self::Conflict(msg.to_owned())
    }

    pub(crate) fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_owned())
    }

    pub(crate) fn unauthorized(msg: &str) -> Self {
        Self::Unauthorized(msg.to_owned())
    }

    pub(crate) fn not_found(msg: &str) -> Self {
        Self::NotFound(msg.to_owned())
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::QuizNotFound(_) => Self::not_found("quiz not found"),
            StoreError::SessionNotFound(_) => Self::not_found("session not found"),
            StoreError::InvalidQuiz { .. } => Self::Validation(err.to_string()),
            StoreError::DuplicatePin(_)
            | StoreError::DuplicateSession(_)
            | StoreError::Unavailable(_)
            | StoreError::Io(_)
            | StoreError::Parse(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AccessError> for GameError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidToken(_) => Self::Authentication("invalid token".into()),
            AccessError::Expired => Self::Authentication("token expired".into()),
            AccessError::AlreadyJoined(..) => {
                Self::conflict("connection already joined a session")
            }
            AccessError::UnknownConnection(_) | AccessError::AlreadyConnected(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<ProtocolError> for GameError {
    fn from(err: ProtocolError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use quizhall_protocol::{Pin, QuizId};

    use super::*;

    #[test]
    fn test_code_matches_taxonomy() {
        assert_eq!(GameError::Authentication(String::new()).code(), 401);
        assert_eq!(GameError::Unauthorized(String::new()).code(), 403);
        assert_eq!(GameError::NotFound(String::new()).code(), 404);
        assert_eq!(GameError::Validation(String::new()).code(), 400);
        assert_eq!(GameError::Conflict(String::new()).code(), 409);
        assert_eq!(GameError::ResourceExhausted(String::new()).code(), 503);
        assert_eq!(GameError::Internal(String::new()).code(), 500);
    }

    #[test]
    fn test_client_message_hides_internal_detail() {
        let err = GameError::Internal("disk on fire".into());
        assert_eq!(err.client_message(), "internal error");
        let err = GameError::conflict("name already taken");
        assert_eq!(err.client_message(), "name already taken");
    }

    #[test]
    fn test_from_store_error_quiz_not_found() {
        let err = GameError::from(StoreError::QuizNotFound(QuizId::from("q")));
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[test]
    fn test_from_store_error_unavailable_is_internal() {
        let err = GameError::from(StoreError::Unavailable("down".into()));
        assert_eq!(err.code(), 500);
        let err = GameError::from(StoreError::DuplicatePin(Pin::new_unchecked("123456")));
        assert_eq!(err.code(), 500);
    }

    #[test]
    fn test_from_access_error_expired_is_authentication() {
        let err = GameError::from(AccessError::Expired);
        assert_eq!(err.code(), 401);
    }
}
