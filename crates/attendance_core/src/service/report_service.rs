//! Attendance report assembly.
//!
//! # Responsibility
//! - Compose calendar and aggregation outputs into the student and teacher views.
//! - Resolve the default reporting month from the injected clock.
//!
//! # Invariants
//! - Reports are recomputed on every call and never persisted.
//! - Month numbers are 1-based on input and output.
//! - The roster view has exactly one entry per roster student.

use crate::clock::{Clock, SystemClock};
use crate::model::period::YearMonth;
use crate::model::roster::RosterRole;
use crate::repo::record_repo::RecordRepository;
use crate::repo::roster_repo::RosterRepository;
use crate::service::aggregate::{
    history_by_month, students_for_month, MonthSummary, StudentSummary,
};
use crate::service::calendar::{materialize_month, MonthCalendar};
use crate::service::error::ServiceError;
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// Optional month filter for the roster-wide view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterQuery {
    /// 1-based month; defaults to the current month.
    pub month: Option<u32>,
    /// Defaults to the current year.
    pub year: Option<i32>,
}

/// Teacher view: every roster student's summary for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterReport {
    /// 1-based month.
    pub month: u32,
    pub year: i32,
    pub students: Vec<StudentSummary>,
}

/// Read-side facade over record and roster repositories.
pub struct ReportService<R: RecordRepository, S: RosterRepository, C: Clock = SystemClock> {
    records: R,
    roster: S,
    clock: C,
}

impl<R: RecordRepository, S: RosterRepository> ReportService<R, S, SystemClock> {
    pub fn new(records: R, roster: S) -> Self {
        Self::with_clock(records, roster, SystemClock)
    }
}

impl<R: RecordRepository, S: RosterRepository, C: Clock> ReportService<R, S, C> {
    pub fn with_clock(records: R, roster: S, clock: C) -> Self {
        Self {
            records,
            roster,
            clock,
        }
    }

    /// Day grid of the current month for one student.
    pub fn current_month(&self, student_id: &str) -> Result<MonthCalendar, ServiceError> {
        self.calendar_as_of(student_id, self.clock.today())
    }

    /// Day grid of the month containing `as_of`.
    pub fn calendar_as_of(
        &self,
        student_id: &str,
        as_of: NaiveDate,
    ) -> Result<MonthCalendar, ServiceError> {
        self.month_calendar(student_id, YearMonth::of(as_of))
    }

    /// Day grid of any month for one student.
    pub fn month_calendar(
        &self,
        student_id: &str,
        month: YearMonth,
    ) -> Result<MonthCalendar, ServiceError> {
        let records = self.records.list_month_records(month, Some(student_id))?;
        debug!(
            "event=report_build module=service view=calendar month={} record_count={}",
            month,
            records.len()
        );
        Ok(materialize_month(month, &records))
    }

    /// One student's history grouped by month, in first-seen month order.
    pub fn student_history(&self, student_id: &str) -> Result<Vec<MonthSummary>, ServiceError> {
        let records = self.records.list_student_records(student_id)?;
        debug!(
            "event=report_build module=service view=history record_count={}",
            records.len()
        );
        Ok(history_by_month(records))
    }

    /// Roster-wide summary for the requested or current month.
    ///
    /// # Errors
    /// - `Validation` when `query.month` is outside `1..=12`.
    /// - `Store` when roster or record reads fail.
    pub fn all_students(&self, query: &RosterQuery) -> Result<RosterReport, ServiceError> {
        let month = self.resolve_month(query)?;
        let students = self.roster.list_members(RosterRole::Student)?;
        let records = self.records.list_month_records(month, None)?;
        debug!(
            "event=report_build module=service view=roster month={} student_count={} record_count={}",
            month,
            students.len(),
            records.len()
        );

        Ok(RosterReport {
            month: month.month(),
            year: month.year(),
            students: students_for_month(&students, &records, month),
        })
    }

    fn resolve_month(&self, query: &RosterQuery) -> Result<YearMonth, ServiceError> {
        let today = self.clock.today();
        let month = query.month.unwrap_or_else(|| today.month());
        let year = query.year.unwrap_or_else(|| today.year());
        Ok(YearMonth::new(year, month)?)
    }
}
