//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the record store and roster contracts used by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - The record store enforces `(student_id, date)` uniqueness.
//! - Read paths reject malformed persisted ids/dates instead of masking them.

pub mod record_repo;
pub mod roster_repo;

mod schema;
