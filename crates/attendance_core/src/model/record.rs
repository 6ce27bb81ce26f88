//! Attendance record domain model.
//!
//! # Responsibility
//! - Define the canonical per-day attendance record.
//! - Parse and validate raw mark input (`date`, `status`).
//!
//! # Invariants
//! - `id` is generated once at creation and never reused.
//! - `(student_id, date)` identifies at most one record.
//! - `student_name` is a snapshot taken at first mark and is not re-synced.
//! - `created_at <= updated_at`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Canonical text form for record dates.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Stable identifier for one attendance record.
pub type RecordId = Uuid;

/// Attendance status for one day.
///
/// `Other` only appears when reading rows written by an older or foreign
/// writer; new marks are restricted to the three recognized kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
    Other(String),
}

impl AttendanceStatus {
    /// Maps a stored value without rejecting unknown kinds.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "present" => Self::Present,
            "absent" => Self::Absent,
            "leave" => Self::Leave,
            other => Self::Other(other.to_string()),
        }
    }

    /// Parses mark input, accepting only recognized kinds.
    ///
    /// # Errors
    /// - `MissingStatus` when input is blank.
    /// - `UnknownStatus` for anything other than `present|absent|leave`.
    pub fn parse_input(raw: &str) -> Result<Self, RecordValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RecordValidationError::MissingStatus);
        }
        match Self::from_stored(trimmed.to_ascii_lowercase().as_str()) {
            Self::Other(_) => Err(RecordValidationError::UnknownStatus(trimmed.to_string())),
            status => Ok(status),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Leave => "leave",
            Self::Other(value) => value.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AttendanceStatus {
    fn from(value: String) -> Self {
        Self::from_stored(value.as_str())
    }
}

impl From<AttendanceStatus> for String {
    fn from(value: AttendanceStatus) -> Self {
        match value {
            AttendanceStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One student's attendance status for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    /// Weak reference into the roster.
    pub student_id: String,
    /// Display name captured when the record was first created.
    pub student_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed on every status change.
    pub updated_at: i64,
}

impl AttendanceRecord {
    /// Creates a fresh record with a generated id and both timestamps at `now_ms`.
    pub fn new(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: student_id.into(),
            student_name: student_name.into(),
            date,
            status,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Canonical `YYYY-MM-DD` key of this record's date.
    pub fn date_key(&self) -> String {
        format_date_key(self.date)
    }
}

/// Formats a date as its zero-padded `YYYY-MM-DD` key.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` key from mark input.
///
/// # Errors
/// - `MissingDate` when input is blank.
/// - `InvalidDate` when input is not a zero-padded calendar date.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate, RecordValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecordValidationError::MissingDate);
    }
    // Unpadded input would never match calendar keys.
    if trimmed.len() != 10 {
        return Err(RecordValidationError::InvalidDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT)
        .map_err(|_| RecordValidationError::InvalidDate(trimmed.to_string()))
}

/// Validation errors for attendance input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    MissingDate,
    MissingStatus,
    InvalidDate(String),
    UnknownStatus(String),
    InvalidMonth(u32),
    InvalidYear(i32),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate => write!(f, "date is required"),
            Self::MissingStatus => write!(f, "status is required"),
            Self::InvalidDate(value) => {
                write!(f, "date `{value}` is not a valid YYYY-MM-DD calendar date")
            }
            Self::UnknownStatus(value) => {
                write!(f, "status `{value}` is not one of present|absent|leave")
            }
            Self::InvalidMonth(value) => write!(f, "month {value} is outside 1..=12"),
            Self::InvalidYear(value) => {
                write!(f, "year {value} is outside the supported calendar range")
            }
        }
    }
}

impl Error for RecordValidationError {}
