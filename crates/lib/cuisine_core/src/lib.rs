//! # cuisine_core
//!
//! Core domain logic for Cuisine Quest: accounts, tokens, favorites, the
//! client-side session controller and the upstream recipe API client.

pub mod accounts;
pub mod auth;
pub mod favorites;
pub mod mail;
pub mod meals;
pub mod migrate;
pub mod models;
pub mod session;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
