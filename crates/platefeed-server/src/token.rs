//! The token authority: issues and verifies signed session tokens.
//!
//! A token is `base64url(claims_json) . hex(mac)` where the MAC is a keyed
//! BLAKE3 hash of the serialized claims under a server-held 32-byte secret.
//! Validity is a pure function of the signature and the clock: nothing is
//! persisted, and there is no revocation list. A token stays valid until its
//! expiry even after logout.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

/// Session validity window.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Which principal collection a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Partner,
}

/// Payload bound into every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub principal_id: Uuid,
    pub kind: PrincipalKind,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// Verification failures.  The session resolver collapses both variants to a
/// plain 401 so clients cannot distinguish expired from tampered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or tampered token")]
    Invalid,

    #[error("token expired")]
    Expired,
}

/// Issues and verifies session tokens with a keyed-BLAKE3 MAC.
#[derive(Clone)]
pub struct TokenAuthority {
    key: [u8; 32],
}

impl TokenAuthority {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Issue a token for a principal, valid for [`SESSION_TTL_HOURS`].
    pub fn issue(&self, principal_id: Uuid, kind: PrincipalKind) -> String {
        self.issue_with_ttl(principal_id, kind, Duration::hours(SESSION_TTL_HOURS))
    }

    /// Issue a token with an explicit validity window.
    pub fn issue_with_ttl(&self, principal_id: Uuid, kind: PrincipalKind, ttl: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            principal_id,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        // Claims are a closed struct; serialization cannot fail.
        let payload = serde_json::to_vec(&claims).expect("claims serialize");
        let mac = blake3::keyed_hash(&self.key, &payload);

        format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), hex::encode(mac.as_bytes()))
    }

    /// Verify a token and return its claims.
    ///
    /// The MAC comparison is constant-time; it runs before the expiry check
    /// so a forged token learns nothing from timing either path.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let (payload_b64, mac_hex) = token.split_once('.').ok_or(TokenError::Invalid)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Invalid)?;
        let mac: Vec<u8> = hex::decode(mac_hex).map_err(|_| TokenError::Invalid)?;

        let expected = blake3::keyed_hash(&self.key, &payload);
        // Length mismatch is not secret-dependent; only the byte comparison is.
        if mac.len() != 32 || expected.as_bytes().ct_eq(&mac[..]).unwrap_u8() != 1 {
            return Err(TokenError::Invalid);
        }

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        if Utc::now().timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
