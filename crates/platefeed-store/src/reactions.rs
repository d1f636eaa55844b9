//! The reaction ledger: like/save toggles and the `like_count` cache.
//!
//! Every toggle runs as one immediate transaction.  The conditional `DELETE`
//! comes first and its affected-row count decides the direction, so there is
//! no separate existence check that a concurrent toggle could race against.
//! The counter adjustment is a SQL-side delta (`like_count = like_count - 1`)
//! in the same transaction: the relation row and the counter either both land
//! or both roll back, which keeps `like_count` derivable from the `likes`
//! table at every quiescent point.
//!
//! `UNIQUE(food_id, user_id)` on both relation tables is the source of truth;
//! a double insert is rejected by the schema even if every other guard fails.
//!
//! Lock contention (`SQLITE_BUSY`) is retried a bounded number of times
//! before surfacing [`StoreError::Busy`].

use chrono::Utc;
use rusqlite::{params, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::food::row_to_food_item;
use crate::models::FoodItem;

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeState {
    Liked,
    Unliked,
}

/// Outcome of a save toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Saved,
    Unsaved,
}

/// Maximum attempts for a toggle that keeps hitting `SQLITE_BUSY`.
const TOGGLE_ATTEMPTS: u32 = 3;

impl Database {
    /// Toggle a like for `(user_id, food_id)`.
    ///
    /// Fails with [`StoreError::NotFound`] when either record is missing;
    /// nothing is mutated in that case.
    pub fn toggle_like(&self, user_id: Uuid, food_id: Uuid) -> Result<LikeState> {
        self.with_busy_retry(|| {
            let mut conn = self.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            ensure_pair_exists(&tx, user_id, food_id)?;

            let removed = tx.execute(
                "DELETE FROM likes WHERE food_id = ?1 AND user_id = ?2",
                params![food_id.to_string(), user_id.to_string()],
            )?;

            let state = if removed > 0 {
                // The row existed, so the counter is >= 1; the CHECK constraint
                // backstops against drift ever taking it below zero.
                tx.execute(
                    "UPDATE food_items SET like_count = like_count - 1 WHERE id = ?1",
                    params![food_id.to_string()],
                )?;
                LikeState::Unliked
            } else {
                tx.execute(
                    "INSERT INTO likes (food_id, user_id, created_at) VALUES (?1, ?2, ?3)",
                    params![
                        food_id.to_string(),
                        user_id.to_string(),
                        Utc::now().to_rfc3339(),
                    ],
                )?;
                tx.execute(
                    "UPDATE food_items SET like_count = like_count + 1 WHERE id = ?1",
                    params![food_id.to_string()],
                )?;
                LikeState::Liked
            };

            tx.commit()?;

            tracing::debug!(%user_id, %food_id, ?state, "like toggled");
            Ok(state)
        })
    }

    /// Toggle a save for `(user_id, food_id)`.  Same contract as
    /// [`Database::toggle_like`]; no counter is maintained for saves.
    pub fn toggle_save(&self, user_id: Uuid, food_id: Uuid) -> Result<SaveState> {
        self.with_busy_retry(|| {
            let mut conn = self.conn();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            ensure_pair_exists(&tx, user_id, food_id)?;

            let removed = tx.execute(
                "DELETE FROM saved_foods WHERE food_id = ?1 AND user_id = ?2",
                params![food_id.to_string(), user_id.to_string()],
            )?;

            let state = if removed > 0 {
                SaveState::Unsaved
            } else {
                tx.execute(
                    "INSERT INTO saved_foods (food_id, user_id, created_at) VALUES (?1, ?2, ?3)",
                    params![
                        food_id.to_string(),
                        user_id.to_string(),
                        Utc::now().to_rfc3339(),
                    ],
                )?;
                SaveState::Saved
            };

            tx.commit()?;

            tracing::debug!(%user_id, %food_id, ?state, "save toggled");
            Ok(state)
        })
    }

    /// All food items the user has saved, most recently saved first.
    pub fn list_saved(&self, user_id: Uuid) -> Result<Vec<FoodItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT f.id, f.name, f.description, f.price, f.media_url, f.media_kind,
                    f.category, f.partner_id, f.like_count, f.created_at
             FROM saved_foods s
             JOIN food_items f ON f.id = s.food_id
             WHERE s.user_id = ?1
             ORDER BY s.created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id.to_string()], row_to_food_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Live cardinality of the like relation for one item.
    ///
    /// `food_items.like_count` must always equal this; the query exists as
    /// the recovery path if the cache ever needs rebuilding.
    pub fn count_likes(&self, food_id: Uuid) -> Result<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM likes WHERE food_id = ?1",
            params![food_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn with_busy_retry<T>(&self, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Err(StoreError::Sqlite(e)) if is_busy(&e) && attempt < TOGGLE_ATTEMPTS => {
                    tracing::warn!(attempt, "toggle hit SQLITE_BUSY, retrying");
                    attempt += 1;
                    std::thread::sleep(std::time::Duration::from_millis(20 * attempt as u64));
                }
                Err(StoreError::Sqlite(e)) if is_busy(&e) => return Err(StoreError::Busy),
                other => return other,
            }
        }
    }
}

fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::DatabaseBusy
                || f.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

/// Verify both ends of the relation exist before mutating anything.
fn ensure_pair_exists(tx: &rusqlite::Transaction<'_>, user_id: Uuid, food_id: Uuid) -> Result<()> {
    let user_exists: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
    if !user_exists {
        return Err(StoreError::NotFound);
    }

    let food_exists: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM food_items WHERE id = ?1)",
            params![food_id.to_string()],
            |row| row.get(0),
        )?;
    if !food_exists {
        return Err(StoreError::NotFound);
    }

    Ok(())
}
