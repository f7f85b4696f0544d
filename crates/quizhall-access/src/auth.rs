//! The identity gate: how hosts prove who they are.
//!
//! Quizhall does not issue credentials. Hosts log in somewhere else and
//! present a bearer token over the socket; the server hands that token to an
//! [`IdentityGate`] and gets back the host's subject id. Players never
//! authenticate, they are anonymous and identified by their connection.
//!
//! Being a trait, the gate can be a JWT verifier in production and a fixed
//! lookup table in tests without the server knowing the difference.

use std::future::Future;

use quizhall_protocol::HostId;

use crate::AccessError;

/// A verified host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject id; compared against quiz and session ownership.
    pub host_id: HostId,
    /// Contact address carried by the credential, used only for logging.
    pub email: Option<String>,
}

/// Verifies a bearer credential and returns the host it belongs to.
///
/// # Example
///
/// ```rust
/// use quizhall_access::{AccessError, Identity, IdentityGate};
/// use quizhall_protocol::HostId;
///
/// /// Treats the token itself as the host id. Development only.
/// struct TrustingGate;
///
/// impl IdentityGate for TrustingGate {
///     async fn verify(&self, token: &str) -> Result<Identity, AccessError> {
///         if token.is_empty() {
///             return Err(AccessError::InvalidToken("empty".into()));
///         }
///         Ok(Identity { host_id: HostId(token.to_owned()), email: None })
///     }
/// }
/// ```
pub trait IdentityGate: Send + Sync + 'static {
    /// Resolves `token` to a host identity.
    ///
    /// # Errors
    /// [`AccessError::InvalidToken`] or [`AccessError::Expired`].
    fn verify(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Identity, AccessError>> + Send;
}
