//! HS256 JWT verification for host credentials.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use quizhall_protocol::HostId;

use crate::{AccessError, Identity, IdentityGate};

/// Claims carried by a host access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostClaims {
    /// Subject id of the host account.
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// An [`IdentityGate`] that accepts HS256-signed JWTs with [`HostClaims`].
pub struct JwtGate {
    key: DecodingKey,
    validation: Validation,
}

impl JwtGate {
    /// Creates a gate that verifies tokens signed with `secret`.
    pub fn hs256(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Tolerated clock skew when checking `exp`, in seconds.
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.validation.leeway = secs;
        self
    }
}

impl IdentityGate for JwtGate {
    async fn verify(&self, token: &str) -> Result<Identity, AccessError> {
        let data = decode::<HostClaims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AccessError::Expired,
                _ => AccessError::InvalidToken(e.to_string()),
            })?;

        let HostClaims { user_id, email, .. } = data.claims;
        if user_id.trim().is_empty() {
            return Err(AccessError::InvalidToken("missing subject".into()));
        }

        tracing::debug!(host_id = %user_id, "host credential verified");
        Ok(Identity {
            host_id: HostId(user_id),
            email,
        })
    }
}
