//! Calendar month materialization for one student.
//!
//! Every day of the month is present in the output; unmarked days carry
//! `status: None` instead of being omitted.

use crate::model::period::YearMonth;
use crate::model::record::{format_date_key, AttendanceRecord, AttendanceStatus};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One calendar day annotated with its attendance status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub day: u32,
    /// Zero-padded `YYYY-MM-DD` key.
    pub date: String,
    pub status: Option<AttendanceStatus>,
}

/// All days of one month for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCalendar {
    /// 1-based month.
    pub month: u32,
    pub year: i32,
    pub days: Vec<DayCell>,
}

/// Builds the day grid for `month` from one student's records.
///
/// Records dated outside `month` are ignored. When several records share a
/// date, the first one wins.
pub fn materialize_month(month: YearMonth, records: &[AttendanceRecord]) -> MonthCalendar {
    let mut status_by_date: HashMap<NaiveDate, &AttendanceStatus> = HashMap::new();
    for record in records.iter().filter(|record| month.contains(record.date)) {
        status_by_date.entry(record.date).or_insert(&record.status);
    }

    let days = month
        .days()
        .map(|date| DayCell {
            day: date.day(),
            date: format_date_key(date),
            status: status_by_date.get(&date).map(|status| (*status).clone()),
        })
        .collect();

    MonthCalendar {
        month: month.month(),
        year: month.year(),
        days,
    }
}
