//! Registration, login, and logout for both principal kinds.
//!
//! Registration logs the principal in immediately (token issued alongside
//! the 201).  Login failures return a single "Invalid credentials" message
//! whether the email is unknown or the password wrong.  Logout only clears
//! the cookie; the token itself stays valid until expiry.

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use platefeed_store::partners::NewPartner;
use platefeed_store::StoreError;

use crate::api::AppState;
use crate::error::ApiError;
use crate::password;
use crate::session::{
    clear_session_cookie, set_session_cookie, AuthPartner, AuthUser, PARTNER_COOKIE, USER_COOKIE,
};
use crate::token::PrincipalKind;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(register_user))
        .route("/user/login", post(login_user))
        .route("/user/logout", get(logout_user))
        .route("/foodPartner/register", post(register_partner))
        .route("/foodPartner/login", post(login_partner))
        .route("/foodPartner/logout", get(logout_partner))
        .route("/foodPartner/me", get(partner_me))
        .route("/foodPartner/:id", get(partner_by_id))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUserRequest {
    full_name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.full_name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }

    let hash = password::hash(&req.password)?;
    let user = state
        .db
        .create_user(&req.full_name, &req.email, &hash)
        .map_err(|e| match e {
            StoreError::Conflict => ApiError::Conflict("User already exists".to_string()),
            other => other.into(),
        })?;

    tracing::info!(user = %user.id, "user registered");

    let token = state.tokens.issue(user.id, PrincipalKind::User);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, set_session_cookie(USER_COOKIE, &token));

    Ok((
        StatusCode::CREATED,
        headers,
        Json(json!({
            "user": AuthUser::from(user),
            "message": "User registered successfully",
        })),
    ))
}

async fn login_user(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || ApiError::Validation("Invalid credentials".to_string());

    let user = state.db.find_user_by_email(&req.email).map_err(|_| invalid())?;
    if !password::verify(&req.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = state.tokens.issue(user.id, PrincipalKind::User);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, set_session_cookie(USER_COOKIE, &token));

    Ok((
        StatusCode::OK,
        headers,
        Json(json!({
            "user": AuthUser::from(user),
            "message": "User logged in successfully",
        })),
    ))
}

async fn logout_user() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear_session_cookie(USER_COOKIE));
    (
        headers,
        Json(json!({ "message": "User logged out successfully" })),
    )
}

// ---------------------------------------------------------------------------
// Food partners
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPartnerRequest {
    email: String,
    password: String,
    restaurant_name: String,
    contact_name: String,
    phone: String,
    address: String,
}

async fn register_partner(
    State(state): State<AppState>,
    Json(req): Json<RegisterPartnerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty()
        || req.password.is_empty()
        || req.restaurant_name.trim().is_empty()
        || req.contact_name.trim().is_empty()
        || req.phone.trim().is_empty()
        || req.address.trim().is_empty()
    {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }

    let hash = password::hash(&req.password)?;
    let partner = state
        .db
        .create_partner(&NewPartner {
            restaurant_name: &req.restaurant_name,
            contact_name: &req.contact_name,
            phone: &req.phone,
            address: &req.address,
            email: &req.email,
            password_hash: &hash,
        })
        .map_err(|e| match e {
            StoreError::Conflict => ApiError::Conflict("User already exists".to_string()),
            other => other.into(),
        })?;

    tracing::info!(partner = %partner.id, "food partner registered");

    let token = state.tokens.issue(partner.id, PrincipalKind::Partner);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, set_session_cookie(PARTNER_COOKIE, &token));

    Ok((
        StatusCode::CREATED,
        headers,
        Json(json!({
            "foodPartner": AuthPartner::from(partner),
            "message": "Food Partner registered successfully",
        })),
    ))
}

async fn login_partner(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || ApiError::Validation("Invalid credentials".to_string());

    let partner = state
        .db
        .find_partner_by_email(&req.email)
        .map_err(|_| invalid())?;
    if !password::verify(&req.password, &partner.password_hash) {
        return Err(invalid());
    }

    let token = state.tokens.issue(partner.id, PrincipalKind::Partner);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, set_session_cookie(PARTNER_COOKIE, &token));

    Ok((
        StatusCode::OK,
        headers,
        Json(json!({
            "foodPartner": AuthPartner::from(partner),
            "message": "Food Partner logged in successfully",
        })),
    ))
}

async fn logout_partner() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear_session_cookie(PARTNER_COOKIE));
    (
        headers,
        Json(json!({ "message": "Food Partner logged out successfully" })),
    )
}

/// The calling partner's own profile.
async fn partner_me(partner: AuthPartner) -> impl IntoResponse {
    Json(json!({ "foodPartner": partner, "success": true }))
}

/// Any partner's public profile; requires a partner session.
async fn partner_by_id(
    _caller: AuthPartner,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let partner = state.db.find_partner_by_id(id).map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("Food partner not found".to_string()),
        other => other.into(),
    })?;

    Ok(Json(json!({
        "foodPartner": AuthPartner::from(partner),
        "success": true,
    })))
}
