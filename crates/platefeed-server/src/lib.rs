//! # platefeed-server
//!
//! HTTP backend for the platefeed food-sharing app.
//!
//! Two independent principal kinds share one origin: end users and food
//! partners.  Each gets its own signed session cookie, verified by the
//! [`token::TokenAuthority`] and resolved against the store by the extractors
//! in [`session`].  Partners publish food items (media goes to an external
//! CDN via [`media`]); users like and save items through the store's reaction
//! ledger.

pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod password;
pub mod routes;
pub mod session;
pub mod token;
