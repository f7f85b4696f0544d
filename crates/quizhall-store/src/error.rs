//! Error types for the storage layer.

use quizhall_protocol::{Pin, QuizId, SessionId};

/// Errors raised by the quiz catalog and the session store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No quiz with this id exists.
    #[error("quiz {0} not found")]
    QuizNotFound(QuizId),

    /// No session with this id exists.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// Another session already holds this PIN.
    #[error("pin {0} is already in use")]
    DuplicatePin(Pin),

    /// A session with this id was already created.
    #[error("session {0} already exists")]
    DuplicateSession(SessionId),

    /// A quiz failed validation while being loaded into the catalog.
    #[error("quiz {id} is invalid: {reason}")]
    InvalidQuiz { id: QuizId, reason: String },

    /// The backing store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading a quiz seed file failed.
    #[error("failed to read quiz seed: {0}")]
    Io(#[from] std::io::Error),

    /// A quiz seed file is not valid JSON for the quiz schema.
    #[error("failed to parse quiz seed: {0}")]
    Parse(#[from] serde_json::Error),
}
