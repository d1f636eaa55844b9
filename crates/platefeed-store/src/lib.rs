//! # platefeed-store
//!
//! SQLite persistence layer for the platefeed backend.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` behind a mutex and provides typed helpers for every
//! domain model: principal records (users and food partners), the food
//! catalog, and the like/save reaction ledger.
//!
//! The reaction ledger is the one part with real invariants: each toggle is a
//! single transaction so the relation row and the denormalized `like_count`
//! on the food item can never drift apart.

pub mod database;
pub mod food;
pub mod migrations;
pub mod models;
pub mod partners;
pub mod reactions;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use reactions::{LikeState, SaveState};
