//! Attendance domain model.
//!
//! # Responsibility
//! - Define canonical record, roster, and calendar period shapes.
//! - Own input validation for dates, statuses, and months.
//!
//! # Invariants
//! - A record is identified by a stable `RecordId` and keyed by `(student_id, date)`.
//! - Records are never physically deleted.

pub mod period;
pub mod record;
pub mod roster;
