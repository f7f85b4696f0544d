//! Access control for Quizhall.
//!
//! Two concerns live here:
//!
//! 1. **Identity**: turning a host's bearer credential into a [`HostId`]
//!    through the [`IdentityGate`] trait ([`JwtGate`] for HS256 tokens).
//! 2. **Presence**: the [`ParticipantRegistry`], which maps each live
//!    connection to its identity, its session and its role. Every inbound
//!    event is authorized against this registry, and disconnect cleanup
//!    starts from it.
//!
//! ```text
//! Game layer (above)   ← asks "who sent this, and may they?"
//!     ↕
//! Access layer (this crate)
//!     ↕
//! Protocol layer (below) ← provides ids and events
//! ```
//!
//! [`HostId`]: quizhall_protocol::HostId

mod auth;
mod error;
mod jwt;
mod registry;

pub use auth::{Identity, IdentityGate};
pub use error::AccessError;
pub use jwt::{HostClaims, JwtGate};
pub use registry::{Binding, Member, Membership, Outbox, ParticipantRegistry, Role};
