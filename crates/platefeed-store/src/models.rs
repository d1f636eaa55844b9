//! Domain model structs persisted in the SQLite database.
//!
//! Principal records carry their password hash; the server layer is
//! responsible for stripping it before a record crosses the HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// An end-user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    /// Unique across all users; enforced by the store at creation.
    pub email: String,
    /// Argon2id PHC string. Never serialized out of the server layer.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Food partner
// ---------------------------------------------------------------------------

/// A restaurant account that publishes food items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodPartner {
    pub id: Uuid,
    pub restaurant_name: String,
    pub contact_name: String,
    pub phone: String,
    pub address: String,
    /// Unique across all partners; enforced by the store at creation.
    pub email: String,
    /// Argon2id PHC string. Never serialized out of the server layer.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Food item
// ---------------------------------------------------------------------------

/// Coarse media classification returned by the media CDN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// A published food item, owned by exactly one partner.
///
/// `like_count` is a derived cache: it must equal the number of like rows
/// referencing this item at every quiescent point. Only the reaction ledger
/// writes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub media_url: String,
    pub media_kind: MediaKind,
    pub category: String,
    pub partner_id: Uuid,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}
