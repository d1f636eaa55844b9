//! Credential store operations for [`FoodPartner`] records.
//!
//! Partners are a fully independent principal collection: a partner and a
//! user may share an email address without conflict.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::FoodPartner;
use crate::users::{not_found, parse_timestamp, parse_uuid};

/// Registration fields for a new partner.
#[derive(Debug, Clone)]
pub struct NewPartner<'a> {
    pub restaurant_name: &'a str,
    pub contact_name: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

impl Database {
    /// Insert a new food partner.  Returns the full stored record.
    ///
    /// Fails with [`StoreError::Conflict`] when the email is already taken.
    pub fn create_partner(&self, fields: &NewPartner<'_>) -> Result<FoodPartner> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn()
            .execute(
                "INSERT INTO food_partners
                   (id, restaurant_name, contact_name, phone, address, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.to_string(),
                    fields.restaurant_name,
                    fields.contact_name,
                    fields.phone,
                    fields.address,
                    fields.email,
                    fields.password_hash,
                    now.to_rfc3339(),
                ],
            )
            .map_err(StoreError::from_sqlite)?;

        Ok(FoodPartner {
            id,
            restaurant_name: fields.restaurant_name.to_string(),
            contact_name: fields.contact_name.to_string(),
            phone: fields.phone.to_string(),
            address: fields.address.to_string(),
            email: fields.email.to_string(),
            password_hash: fields.password_hash.to_string(),
            created_at: now,
        })
    }

    /// Fetch a single partner by UUID.
    pub fn find_partner_by_id(&self, id: Uuid) -> Result<FoodPartner> {
        self.conn()
            .query_row(
                "SELECT id, restaurant_name, contact_name, phone, address, email, password_hash, created_at
                 FROM food_partners
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_partner,
            )
            .map_err(not_found)
    }

    /// Fetch a single partner by email.
    pub fn find_partner_by_email(&self, email: &str) -> Result<FoodPartner> {
        self.conn()
            .query_row(
                "SELECT id, restaurant_name, contact_name, phone, address, email, password_hash, created_at
                 FROM food_partners
                 WHERE email = ?1",
                params![email],
                row_to_partner,
            )
            .map_err(not_found)
    }
}

/// Map a `rusqlite::Row` to a [`FoodPartner`].
fn row_to_partner(row: &rusqlite::Row<'_>) -> rusqlite::Result<FoodPartner> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(7)?;

    Ok(FoodPartner {
        id: parse_uuid(0, &id_str)?,
        restaurant_name: row.get(1)?,
        contact_name: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        email: row.get(5)?,
        password_hash: row.get(6)?,
        created_at: parse_timestamp(7, &created_str)?,
    })
}
