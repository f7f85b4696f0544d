//! Wire protocol for Quizhall.
//!
//! This crate defines the language hosts, players and the server speak:
//!
//! - **Identifiers** ([`SessionId`], [`QuizId`], [`HostId`], [`PlayerId`],
//!   [`Pin`]) shared by every layer above.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) and the views they carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) that turns events into frames.
//! - **Validation** of inbound payload ranges, run before any event reaches
//!   the game engine.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Access / Game
//! ```

mod codec;
mod error;
mod events;
mod ids;
mod validate;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{
    ClientEvent, LeaderboardEntry, QuestionView, QuizSummary, Recipient,
    RosterEntry, ServerEvent, SessionSummary,
};
pub use ids::{HostId, Pin, PlayerId, QuizId, SessionId};
pub use validate::{MAX_NAME_CHARS, OPTION_COUNT, validate_display_name};
