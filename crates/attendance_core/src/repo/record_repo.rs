//! Attendance record store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the `(student_id, date) -> record` mapping.
//! - Apply status upserts as one read-modify-write unit.
//!
//! # Invariants
//! - At most one row per `(student_id, date)`; the table carries a UNIQUE
//!   constraint as backstop.
//! - Updates only touch `status` and `updated_at`.
//! - Listings are returned in insertion order unless stated otherwise.

use crate::db::DbError;
use crate::model::period::YearMonth;
use crate::model::record::{
    format_date_key, AttendanceRecord, AttendanceStatus, RecordId, DATE_KEY_FORMAT,
};
use crate::repo::schema::ensure_connection_ready;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    student_id,
    student_name,
    date,
    status,
    created_at,
    updated_at
FROM attendance_records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for roster and record persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of applying one status upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed for the pair; a new one was inserted.
    Created(RecordId),
    /// An existing record had its status overwritten.
    Updated(RecordId),
}

impl UpsertOutcome {
    pub fn record_id(&self) -> RecordId {
        match self {
            Self::Created(id) | Self::Updated(id) => *id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
        }
    }
}

/// Status write for one `(student_id, date)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpsert<'a> {
    pub student_id: &'a str,
    /// Only used when the record is created.
    pub student_name: &'a str,
    pub date: NaiveDate,
    pub status: &'a AttendanceStatus,
    pub now_ms: i64,
}

/// Repository interface for the attendance record store.
pub trait RecordRepository {
    /// Inserts or updates the record for `(student_id, date)` atomically.
    fn upsert_status(&self, upsert: &StatusUpsert<'_>) -> RepoResult<UpsertOutcome>;
    /// Gets the record for one `(student_id, date)` pair.
    fn get_record(&self, student_id: &str, date: NaiveDate)
        -> RepoResult<Option<AttendanceRecord>>;
    /// Lists one student's records in insertion order.
    fn list_student_records(&self, student_id: &str) -> RepoResult<Vec<AttendanceRecord>>;
    /// Lists records dated within `month`, optionally for one student, in insertion order.
    fn list_month_records(
        &self,
        month: YearMonth,
        student_id: Option<&str>,
    ) -> RepoResult<Vec<AttendanceRecord>>;
}

/// SQLite-backed record store.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "attendance_records")?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn upsert_status(&self, upsert: &StatusUpsert<'_>) -> RepoResult<UpsertOutcome> {
        let date_key = format_date_key(upsert.date);
        // IMMEDIATE takes the write lock up front so the lookup and the write
        // cannot interleave with another connection's upsert.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT id
                 FROM attendance_records
                 WHERE student_id = ?1
                   AND date = ?2;",
                params![upsert.student_id, date_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(id_text) => {
                let id = parse_record_id(&id_text)?;
                tx.execute(
                    "UPDATE attendance_records
                     SET
                        status = ?1,
                        updated_at = ?2
                     WHERE id = ?3;",
                    params![upsert.status.as_str(), upsert.now_ms, id_text],
                )?;
                UpsertOutcome::Updated(id)
            }
            None => {
                let id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO attendance_records (
                        id,
                        student_id,
                        student_name,
                        date,
                        status,
                        created_at,
                        updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
                    params![
                        id.to_string(),
                        upsert.student_id,
                        upsert.student_name,
                        date_key.as_str(),
                        upsert.status.as_str(),
                        upsert.now_ms,
                    ],
                )?;
                UpsertOutcome::Created(id)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn get_record(
        &self,
        student_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE student_id = ?1
               AND date = ?2;"
        ))?;

        let mut rows = stmt.query(params![student_id, format_date_key(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn list_student_records(&self, student_id: &str) -> RepoResult<Vec<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE student_id = ?1
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([student_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn list_month_records(
        &self,
        month: YearMonth,
        student_id: Option<&str>,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        // ISO date keys sort lexicographically, so a text range selects the month.
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE date >= ? AND date <= ?");
        let mut bind_values = vec![
            Value::Text(format_date_key(month.first_day())),
            Value::Text(format_date_key(month.last_day())),
        ];
        if let Some(student_id) = student_id {
            sql.push_str(" AND student_id = ?");
            bind_values.push(Value::Text(student_id.to_string()));
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let id_text: String = row.get("id")?;
    let id = parse_record_id(&id_text)?;

    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_KEY_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{date_text}` in attendance_records.date"
        ))
    })?;

    let status_text: String = row.get("status")?;

    Ok(AttendanceRecord {
        id,
        student_id: row.get("student_id")?,
        student_name: row.get("student_name")?,
        date,
        status: AttendanceStatus::from_stored(&status_text),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_record_id(value: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{value}` in attendance_records.id"
        ))
    })
}
