//! Data models
//!
//! Shared between access-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod permission;
pub mod role;

// Re-exports
pub use permission::*;
pub use role::*;
