//! Request handlers, grouped by route prefix.

pub mod auth;
pub mod food;
