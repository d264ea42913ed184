//! Target registry storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the `TargetsStorage` handle

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::DbTarget;
pub use sqlite::{SqlitePool, TargetsStorage};
