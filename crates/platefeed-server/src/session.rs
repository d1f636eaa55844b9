//! Session resolution for the two principal kinds.
//!
//! Users and food partners hold fully independent sessions on the same
//! origin, carried in separate cookies.  A request can legitimately carry
//! neither, one, or both.  The [`AuthUser`] and [`AuthPartner`] extractors
//! gate handlers on the expected kind: cookie -> token verification -> kind
//! check -> live principal lookup -> sanitized principal (password hash
//! stripped) attached to the handler.
//!
//! Every failure collapses to a plain 401; the underlying cause is logged at
//! debug level only.  Resolution is read-only: no sliding expiry, and logout
//! merely clears the cookie client-side.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::error::ApiError;
use crate::token::PrincipalKind;

/// Cookie carrying the end-user session.
pub const USER_COOKIE: &str = "token";
/// Cookie carrying the food-partner session.
pub const PARTNER_COOKIE: &str = "foodPartnerToken";

/// Cookie lifetime, matching the token validity window.
const COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// An authenticated end user, password hash already stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated food partner, password hash already stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPartner {
    pub id: Uuid,
    pub restaurant_name: String,
    pub contact_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<platefeed_store::User> for AuthUser {
    fn from(u: platefeed_store::User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

impl From<platefeed_store::FoodPartner> for AuthPartner {
    fn from(p: platefeed_store::FoodPartner) -> Self {
        Self {
            id: p.id,
            restaurant_name: p.restaurant_name,
            contact_name: p.contact_name,
            phone: p.phone,
            address: p.address,
            email: p.email,
            created_at: p.created_at,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let claims = resolve_claims(&parts.headers, state, USER_COOKIE, PrincipalKind::User)?;

        let user = state.db.find_user_by_id(claims.principal_id).map_err(|e| {
            tracing::debug!(error = %e, "session principal no longer exists");
            ApiError::Unauthorized
        })?;

        Ok(user.into())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthPartner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let claims = resolve_claims(&parts.headers, state, PARTNER_COOKIE, PrincipalKind::Partner)?;

        let partner = state.db.find_partner_by_id(claims.principal_id).map_err(|e| {
            tracing::debug!(error = %e, "session principal no longer exists");
            ApiError::Unauthorized
        })?;

        Ok(partner.into())
    }
}

fn resolve_claims(
    headers: &HeaderMap,
    state: &AppState,
    cookie_name: &str,
    expected_kind: PrincipalKind,
) -> Result<crate::token::Claims, ApiError> {
    let token = parse_cookie(headers, cookie_name).ok_or(ApiError::Unauthorized)?;

    let claims = state.tokens.verify(&token).map_err(|e| {
        // Expired vs tampered must stay indistinguishable to the client.
        tracing::debug!(error = %e, cookie = cookie_name, "session token rejected");
        ApiError::Unauthorized
    })?;

    if claims.kind != expected_kind {
        tracing::debug!(cookie = cookie_name, "session token has wrong principal kind");
        return Err(ApiError::Unauthorized);
    }

    Ok(claims)
}

/// Extract a named cookie value from the request headers.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

/// `Set-Cookie` value establishing a session.
pub fn set_session_cookie(name: &str, token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{name}={token}; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/"
    ))
    .expect("cookie value is ascii")
}

/// `Set-Cookie` value clearing a session.
pub fn clear_session_cookie(name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{name}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/"
    ))
    .expect("cookie value is ascii")
}
