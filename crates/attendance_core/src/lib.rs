//! Core attendance logic: record store, upsert engine, calendar and monthly reports.
//! This crate is the single source of truth for attendance invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use logging::{default_log_level, init_from_config, LoggingError};
pub use model::period::YearMonth;
pub use model::record::{
    format_date_key, parse_date_key, AttendanceRecord, AttendanceStatus, RecordId,
    RecordValidationError,
};
pub use model::roster::{default_roster, RosterMember, RosterRole};
pub use repo::record_repo::{
    RecordRepository, RepoError, RepoResult, SqliteRecordRepository, StatusUpsert, UpsertOutcome,
};
pub use repo::roster_repo::{RosterRepository, SqliteRosterRepository};
pub use service::aggregate::{MonthCounts, MonthSummary, StudentSummary, RATE_NOT_AVAILABLE};
pub use service::attendance_service::{AttendanceService, MarkRequest, MarkResponse};
pub use service::calendar::{DayCell, MonthCalendar};
pub use service::error::ServiceError;
pub use service::report_service::{ReportService, RosterQuery, RosterReport};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
