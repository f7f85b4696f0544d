//! Identifier newtypes shared by every layer.
//!
//! Each id wraps a primitive so a `QuizId` can never be passed where a
//! `SessionId` is expected. All of them serialize transparently: a
//! `PlayerId(42)` is just `42` on the wire, a `Pin` is just `"123456"`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quizhall_transport::ConnectionId;

/// Identifies one session (one play-through of a quiz).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generates a fresh random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0.simple())
    }
}

/// Identifies a quiz in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(pub String);

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuizId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The subject id of an authenticated host, as issued by the identity
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(pub String);

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifies a player within a session.
///
/// Derived from the connection the player joined on, so it only lives as
/// long as that connection does.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl From<ConnectionId> for PlayerId {
    fn from(conn: ConnectionId) -> Self {
        Self(conn.into_inner())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A six-digit join code.
///
/// Deserialization accepts any string so that a malformed PIN surfaces as a
/// validation error rather than a decode error; use
/// [`is_well_formed`](Self::is_well_formed) before trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(String);

impl Pin {
    /// Smallest PIN value (no leading zero, so it reads as six digits).
    pub const MIN: u32 = 100_000;
    /// Largest PIN value.
    pub const MAX: u32 = 999_999;

    /// Builds a PIN from a number in [`MIN`](Self::MIN)..=[`MAX`](Self::MAX).
    pub fn from_number(n: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&n)
            .then(|| Self(n.to_string()))
    }

    /// Wraps a string without checking it.
    pub fn new_unchecked(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// `true` if this is exactly six ASCII digits.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 6 && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
