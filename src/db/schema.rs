//! SQL DDL for initializing the target registry.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `url` UNIQUE so re-registering a project replaces its key
/// - `created_at` stored as RFC3339 text
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS targets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    service_key TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;
