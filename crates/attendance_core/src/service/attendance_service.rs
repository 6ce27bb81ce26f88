//! Attendance marking use-case.
//!
//! # Responsibility
//! - Validate mark input and resolve the student against the roster.
//! - Apply idempotent per-day status upserts through the record store.
//!
//! # Invariants
//! - Repeat marks for one `(student, date)` only change `status` and `updated_at`.
//! - `student_name` is captured at first mark and never rewritten here.
//! - Writers are serialized by the store's immediate transaction.

use crate::clock::{Clock, SystemClock};
use crate::model::record::{
    parse_date_key, AttendanceRecord, AttendanceStatus, RecordValidationError,
};
use crate::model::roster::RosterRole;
use crate::repo::record_repo::{RecordRepository, StatusUpsert, UpsertOutcome};
use crate::repo::roster_repo::RosterRepository;
use crate::service::error::ServiceError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Mark input as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRequest {
    /// `YYYY-MM-DD` day to mark.
    #[serde(default)]
    pub date: String,
    /// One of `present|absent|leave`.
    #[serde(default)]
    pub status: String,
}

impl MarkRequest {
    pub fn new(date: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            status: status.into(),
        }
    }
}

/// Acknowledgement returned after a successful mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkResponse {
    pub message: String,
    pub record_id: String,
    pub created: bool,
}

impl From<UpsertOutcome> for MarkResponse {
    fn from(value: UpsertOutcome) -> Self {
        Self {
            message: "Attendance marked successfully".to_string(),
            record_id: value.record_id().to_string(),
            created: matches!(value, UpsertOutcome::Created(_)),
        }
    }
}

/// Upsert engine facade over record and roster repositories.
pub struct AttendanceService<R: RecordRepository, S: RosterRepository, C: Clock = SystemClock> {
    records: R,
    roster: S,
    clock: C,
}

impl<R: RecordRepository, S: RosterRepository> AttendanceService<R, S, SystemClock> {
    /// Creates a service stamping writes with the system clock.
    pub fn new(records: R, roster: S) -> Self {
        Self::with_clock(records, roster, SystemClock)
    }
}

impl<R: RecordRepository, S: RosterRepository, C: Clock> AttendanceService<R, S, C> {
    pub fn with_clock(records: R, roster: S, clock: C) -> Self {
        Self {
            records,
            roster,
            clock,
        }
    }

    /// Marks one day for the calling student.
    ///
    /// # Contract
    /// - `student_id` is the authenticated caller; `student_name` is only
    ///   stored when the record is created.
    /// - Returns `Created` for the first mark of a day, `Updated` afterwards.
    ///
    /// # Errors
    /// - `Validation` for blank/malformed date or unknown status.
    /// - `NotFound` when `student_id` is not a roster student.
    /// - `Store` when the read-modify-write fails; nothing is retried.
    pub fn mark_attendance(
        &self,
        student_id: &str,
        student_name: &str,
        request: &MarkRequest,
    ) -> Result<UpsertOutcome, ServiceError> {
        let started_at = Instant::now();
        let result = self.apply_mark(student_id, student_name, request);
        match &result {
            Ok(outcome) => info!(
                "event=attendance_mark module=service status=ok outcome={} duration_ms={}",
                outcome.label(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=attendance_mark module=service status=error error_code={} duration_ms={} error={}",
                err.code(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Reads back the record for one `(student, date)` pair.
    pub fn get_record(
        &self,
        student_id: &str,
        date: &str,
    ) -> Result<Option<AttendanceRecord>, ServiceError> {
        let date = parse_date_key(date)?;
        Ok(self.records.get_record(student_id, date)?)
    }

    fn apply_mark(
        &self,
        student_id: &str,
        student_name: &str,
        request: &MarkRequest,
    ) -> Result<UpsertOutcome, ServiceError> {
        if request.date.trim().is_empty() {
            return Err(RecordValidationError::MissingDate.into());
        }
        if request.status.trim().is_empty() {
            return Err(RecordValidationError::MissingStatus.into());
        }
        let date = parse_date_key(&request.date)?;
        let status = AttendanceStatus::parse_input(&request.status)?;

        if self
            .roster
            .find_member(RosterRole::Student, student_id)?
            .is_none()
        {
            return Err(ServiceError::not_found("student", student_id));
        }

        let upsert = StatusUpsert {
            student_id,
            student_name,
            date,
            status: &status,
            now_ms: self.clock.now_ms(),
        };
        Ok(self.records.upsert_status(&upsert)?)
    }
}
