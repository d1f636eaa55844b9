//! CRUD operations for [`FoodItem`] records.
//!
//! `like_count` is written exclusively by the reaction ledger
//! (see [`crate::reactions`]); nothing here touches it past the initial zero.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{FoodItem, MediaKind};
use crate::users::{not_found, parse_timestamp, parse_uuid};

/// Fields for a new food item; media already uploaded to the CDN.
#[derive(Debug, Clone)]
pub struct NewFoodItem<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub media_url: &'a str,
    pub media_kind: MediaKind,
    pub category: &'a str,
    pub partner_id: Uuid,
}

impl Database {
    /// Insert a new food item owned by a partner.  `like_count` starts at 0.
    pub fn create_food_item(&self, fields: &NewFoodItem<'_>) -> Result<FoodItem> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn()
            .execute(
                "INSERT INTO food_items
                   (id, name, description, price, media_url, media_kind, category, partner_id, like_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
                params![
                    id.to_string(),
                    fields.name,
                    fields.description,
                    fields.price,
                    fields.media_url,
                    fields.media_kind.as_str(),
                    fields.category,
                    fields.partner_id.to_string(),
                    now.to_rfc3339(),
                ],
            )
            .map_err(StoreError::from_sqlite)?;

        Ok(FoodItem {
            id,
            name: fields.name.to_string(),
            description: fields.description.to_string(),
            price: fields.price,
            media_url: fields.media_url.to_string(),
            media_kind: fields.media_kind,
            category: fields.category.to_string(),
            partner_id: fields.partner_id,
            like_count: 0,
            created_at: now,
        })
    }

    /// Fetch a single food item by UUID.
    pub fn get_food_item(&self, id: Uuid) -> Result<FoodItem> {
        self.conn()
            .query_row(
                &format!("{SELECT_FOOD} WHERE id = ?1"),
                params![id.to_string()],
                row_to_food_item,
            )
            .map_err(not_found)
    }

    /// List all food items, newest first.
    pub fn list_food_items(&self) -> Result<Vec<FoodItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{SELECT_FOOD} ORDER BY created_at DESC"))?;

        let rows = stmt.query_map([], row_to_food_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// List food items published by a specific partner, newest first.
    pub fn list_food_items_by_partner(&self, partner_id: Uuid) -> Result<Vec<FoodItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_FOOD} WHERE partner_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![partner_id.to_string()], row_to_food_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }
}

const SELECT_FOOD: &str = "SELECT id, name, description, price, media_url, media_kind, category, partner_id, like_count, created_at FROM food_items";

/// Map a `rusqlite::Row` to a [`FoodItem`].
pub(crate) fn row_to_food_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<FoodItem> {
    let id_str: String = row.get(0)?;
    let kind_str: String = row.get(5)?;
    let partner_str: String = row.get(7)?;
    let created_str: String = row.get(9)?;

    let media_kind = MediaKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown media kind: {kind_str}").into(),
        )
    })?;

    Ok(FoodItem {
        id: parse_uuid(0, &id_str)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        media_url: row.get(4)?,
        media_kind,
        category: row.get(6)?,
        partner_id: parse_uuid(7, &partner_str)?,
        like_count: row.get(8)?,
        created_at: parse_timestamp(9, &created_str)?,
    })
}
