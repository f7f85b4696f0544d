//! # Quizhall
//!
//! Real-time quiz game server. A host paces the game, anonymous players
//! join with a six-digit PIN and answer timed multiple-choice questions,
//! and every participant sees the same question, countdown, lock and
//! leaderboard.
//!
//! The server is generic over its collaborators: an [`IdentityGate`] that
//! verifies host credentials, a [`SessionStore`] for durable session
//! records and a [`QuizCatalog`] of question sets.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use quizhall::prelude::*;
//!
//! # async fn run() -> Result<(), QuizhallError> {
//! let server = QuizhallServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(
//!         JwtGate::hs256(b"secret"),
//!         Arc::new(MemorySessionStore::new()),
//!         Arc::new(MemoryCatalog::new()),
//!     )
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! [`IdentityGate`]: quizhall_access::IdentityGate
//! [`SessionStore`]: quizhall_store::SessionStore
//! [`QuizCatalog`]: quizhall_store::QuizCatalog

mod error;
mod handler;
mod server;

pub use error::QuizhallError;
pub use server::{DEFAULT_IDLE_TIMEOUT, QuizhallServer, QuizhallServerBuilder};

pub mod prelude {
    pub use crate::{QuizhallError, QuizhallServer, QuizhallServerBuilder};
    pub use quizhall_access::{AccessError, Identity, IdentityGate, JwtGate};
    pub use quizhall_game::{GameConfig, GameError, ScoringPolicy, StandardScoring};
    pub use quizhall_protocol::{
        ClientEvent, HostId, LeaderboardEntry, Pin, PlayerId, QuizId, ServerEvent, SessionId,
    };
    pub use quizhall_store::{
        MemoryCatalog, MemorySessionStore, Question, Quiz, QuizCatalog, SessionStore,
    };
}
