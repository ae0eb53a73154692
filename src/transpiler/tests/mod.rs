//! Transpiler test modules.
//!
//! Tests are organized by category:
//! - `core`: SELECT, INSERT, UPDATE, DELETE against the default dialect
//! - `dialects`: MySQL and SQLite spellings and capability gaps
//! - `features`: upserts, CTEs, CASE, nested joins, JSON-encoded ASTs

mod core;
