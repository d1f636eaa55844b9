//! The food catalog and the like/save endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use platefeed_store::food::NewFoodItem;
use platefeed_store::{LikeState, SaveState, StoreError};

use crate::api::AppState;
use crate::error::ApiError;
use crate::media::media_kind_for;
use crate::session::{AuthPartner, AuthUser};

pub fn router() -> Router<AppState> {
    // Routes are spelled in full and merged into the top-level router
    // instead of nested: the router does no trailing-slash redirect, and
    // clients post the create endpoint both as /food and /food/.
    Router::new()
        .route("/food", post(create_food))
        .route("/food/", post(create_food))
        .route("/food/getAll", get(get_all_food))
        .route("/food/bypartner/:id", get(food_by_partner))
        .route("/food/like", post(like_food))
        .route("/food/save", post(save_food))
        .route("/food/savedfood", get(saved_food))
}

/// Publish a food item: multipart body with one `media` file plus
/// `name`, `description`, `price`, `category` text fields.
///
/// All validation happens before the CDN is contacted; a disallowed content
/// type never leaves the process.
async fn create_food(
    State(state): State<AppState>,
    partner: AuthPartner,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut name = None;
    let mut description = None;
    let mut price = None;
    let mut category = None;
    let mut media: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "media" => {
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read media: {e}")))?;
                media = Some((content_type, data.to_vec()));
            }
            "name" => name = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "price" => price = Some(read_text(field).await?),
            "category" => category = Some(read_text(field).await?),
            _ => {}
        }
    }

    let (name, description, price, category) = match (name, description, price, category) {
        (Some(n), Some(d), Some(p), Some(c))
            if !n.trim().is_empty()
                && !d.trim().is_empty()
                && !p.trim().is_empty()
                && !c.trim().is_empty() =>
        {
            (n, d, p, c)
        }
        _ => return Err(ApiError::Validation("All fields are required".to_string())),
    };

    let price: f64 = price
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("Price must be a number".to_string()))?;

    let (content_type, data) =
        media.ok_or_else(|| ApiError::Validation("Media file is required".to_string()))?;

    if media_kind_for(&content_type).is_none() {
        return Err(ApiError::Validation(
            "Invalid file type. Only images and videos allowed.".to_string(),
        ));
    }
    if data.len() > state.config.max_media_size {
        return Err(ApiError::Validation("Media file too large".to_string()));
    }

    let upload = state.media.upload(&content_type, data).await?;

    let item = state.db.create_food_item(&NewFoodItem {
        name: &name,
        description: &description,
        price,
        media_url: &upload.url,
        media_kind: upload.kind,
        category: &category,
        partner_id: partner.id,
    })?;

    tracing::info!(food = %item.id, partner = %partner.id, "food item created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "foodinstance": item, "success": true })),
    ))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read field: {e}")))
}

/// The public feed.
async fn get_all_food(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.db.list_food_items()?;
    Ok(Json(json!({ "fooditems": items, "success": true })))
}

/// A single partner's published items; requires a user session.
async fn food_by_partner(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.db.list_food_items_by_partner(id)?;
    Ok(Json(json!({ "fooditems": items, "success": true })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReactionRequest {
    food_id: Uuid,
}

/// Toggle a like.  One endpoint serves both directions; the response
/// message reports which way it went.
async fn like_food(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .db
        .toggle_like(user.id, req.food_id)
        .map_err(food_not_found)?;

    let message = match outcome {
        LikeState::Liked => "Liked",
        LikeState::Unliked => "Unliked",
    };
    Ok(Json(json!({ "message": message, "success": true })))
}

/// Toggle a save; same shape as the like toggle, no counter involved.
async fn save_food(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .db
        .toggle_save(user.id, req.food_id)
        .map_err(food_not_found)?;

    let message = match outcome {
        SaveState::Saved => "Saved",
        SaveState::Unsaved => "Unsaved",
    };
    Ok(Json(json!({ "message": message, "success": true })))
}

/// Everything the calling user has saved.
async fn saved_food(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.db.list_saved(user.id)?;
    Ok(Json(json!({ "foodInstances": items, "success": true })))
}

fn food_not_found(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => ApiError::NotFound("Food not found".to_string()),
        other => other.into(),
    }
}
