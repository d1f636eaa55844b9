//! v001 -- Initial schema creation.
//!
//! Creates the five core tables: `users`, `food_partners`, `food_items`,
//! `likes`, and `saved_foods`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    full_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,               -- Argon2id PHC string
    created_at    TEXT NOT NULL                -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Food partners
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS food_partners (
    id              TEXT PRIMARY KEY NOT NULL, -- UUID v4
    restaurant_name TEXT NOT NULL,
    contact_name    TEXT NOT NULL,
    phone           TEXT NOT NULL,
    address         TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Food items
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS food_items (
    id          TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    price       REAL NOT NULL,
    media_url   TEXT NOT NULL,
    media_kind  TEXT NOT NULL,                 -- 'image' | 'video'
    category    TEXT NOT NULL,
    partner_id  TEXT NOT NULL,                 -- FK -> food_partners(id)
    like_count  INTEGER NOT NULL DEFAULT 0 CHECK (like_count >= 0),
    created_at  TEXT NOT NULL,

    FOREIGN KEY (partner_id) REFERENCES food_partners(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_food_items_partner_id ON food_items(partner_id);

-- ----------------------------------------------------------------
-- Likes (user <-> food item relation, at most one row per pair)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS likes (
    food_id    TEXT NOT NULL,                  -- FK -> food_items(id)
    user_id    TEXT NOT NULL,                  -- FK -> users(id)
    created_at TEXT NOT NULL,

    UNIQUE (food_id, user_id),
    FOREIGN KEY (food_id) REFERENCES food_items(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_likes_food_id ON likes(food_id);

-- ----------------------------------------------------------------
-- Saved foods (same shape as likes, no counter on the item)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS saved_foods (
    food_id    TEXT NOT NULL,
    user_id    TEXT NOT NULL,
    created_at TEXT NOT NULL,

    UNIQUE (food_id, user_id),
    FOREIGN KEY (food_id) REFERENCES food_items(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_saved_foods_user_id ON saved_foods(user_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
