//! Domain models.
//!
//! These are internal domain models, distinct from the HTTP request and
//! response shapes defined in `cuisine_api::models`.

pub mod auth;
pub mod favorites;
pub mod meal;
