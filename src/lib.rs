//! Household inventory tracker.
//!
//! Users create inventories, invite members, and track how much of each
//! product they have against how much they want. Identity comes from an
//! OpenID Connect provider; the service only verifies bearer tokens.
//!
//! - [`membership`] - owner/member rules, inventory creation and deletion,
//!   bulk product unlinking
//! - [`catalog`] - inventory, product and stock-link reads and writes
//! - [`store`] - persistence traits, the SQLite store and the in-memory store
//! - [`identity`] - token verification, sessions, user directory
//! - [`api`] - the axum router (feature `http`)

extern crate self as home_inventory;

pub mod catalog;
pub mod config;
mod error;
pub mod identity;
pub mod membership;
pub mod model;
mod record;
pub mod store;
pub mod telemetry;

#[cfg(feature = "http")]
pub mod api;

pub use error::InventoryError;
pub use record::{Record, Table};
