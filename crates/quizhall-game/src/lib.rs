//! The real-time game session engine for Quizhall.
//!
//! Each live session runs as an isolated Tokio task (actor model) that owns
//! its record, its room and its question countdown. Everything that can
//! race (answers against the timer, host actions against late answers,
//! joins against each other) is serialized by that task.
//!
//! # Key types
//!
//! - [`Lobby`]: creates sessions, rebuilds them for returning hosts, routes
//!   players by PIN
//! - [`SessionHandle`]: sends commands to a running session actor
//! - [`SessionPhase`]: the per-session state machine
//! - [`ScoringPolicy`] / [`StandardScoring`]: how answers become points
//! - [`PinAllocator`]: unique six-digit join codes
//! - [`GameError`]: the error taxonomy surfaced to clients

mod config;
mod engine;
mod error;
mod leaderboard;
mod lobby;
mod phase;
mod pin;
mod scoring;

pub use config::GameConfig;
pub use engine::{AnswerOutcome, Departure, Joined, SessionHandle, Welcome};
pub use error::GameError;
pub use leaderboard::rank;
pub use lobby::Lobby;
pub use phase::SessionPhase;
pub use pin::PinAllocator;
pub use scoring::{ScoringPolicy, StandardScoring};
