//! Monthly attendance aggregation.
//!
//! # Responsibility
//! - Group one student's records into per-month summaries.
//! - Summarize every roster student for one month.
//!
//! # Invariants
//! - `present + absent + leave <= total`; unrecognized statuses only count
//!   toward `total`.
//! - Records inside every summary are sorted ascending by date.
//! - Month summaries keep first-seen order of the input, not calendar order.

use crate::model::period::YearMonth;
use crate::model::record::{AttendanceRecord, AttendanceStatus};
use crate::model::roster::RosterMember;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rate marker used when a period has no marked days.
pub const RATE_NOT_AVAILABLE: &str = "N/A";

/// Status counts over one record subsequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCounts {
    pub present: u32,
    pub absent: u32,
    pub leave: u32,
    pub total: u32,
}

impl MonthCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            counts.total += 1;
            match record.status {
                AttendanceStatus::Present => counts.present += 1,
                AttendanceStatus::Absent => counts.absent += 1,
                AttendanceStatus::Leave => counts.leave += 1,
                AttendanceStatus::Other(_) => {}
            }
        }
        counts
    }

    /// Present share of marked days in percent, `None` when nothing was marked.
    pub fn attendance_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(f64::from(self.present) / f64::from(self.total) * 100.0)
    }

    /// Rate as a two-decimal percentage string, or `N/A`.
    pub fn attendance_rate_label(&self) -> String {
        match self.attendance_rate() {
            Some(rate) => format!("{rate:.2}%"),
            None => RATE_NOT_AVAILABLE.to_string(),
        }
    }
}

/// One student's attendance within one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    /// 1-based month.
    pub month: u32,
    pub year: i32,
    #[serde(flatten)]
    pub counts: MonthCounts,
    pub records: Vec<AttendanceRecord>,
}

/// One roster student's attendance within the requested month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub counts: MonthCounts,
    pub attendance_rate: String,
    pub records: Vec<AttendanceRecord>,
}

/// Groups records by month in the order each month is first seen.
pub fn history_by_month(records: Vec<AttendanceRecord>) -> Vec<MonthSummary> {
    let mut groups: Vec<(YearMonth, Vec<AttendanceRecord>)> = Vec::new();
    let mut index_by_month: HashMap<YearMonth, usize> = HashMap::new();

    for record in records {
        let key = YearMonth::of(record.date);
        let index = *index_by_month.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[index].1.push(record);
    }

    groups
        .into_iter()
        .map(|(key, mut records)| {
            records.sort_by_key(|record| record.date);
            MonthSummary {
                month: key.month(),
                year: key.year(),
                counts: MonthCounts::tally(&records),
                records,
            }
        })
        .collect()
}

/// Summarizes every student for `month`, in roster order.
///
/// Students without records still appear with zero counts and an `N/A` rate.
/// Records outside `month` are ignored.
pub fn students_for_month(
    students: &[RosterMember],
    records: &[AttendanceRecord],
    month: YearMonth,
) -> Vec<StudentSummary> {
    let mut by_student: HashMap<&str, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records.iter().filter(|record| month.contains(record.date)) {
        by_student
            .entry(record.student_id.as_str())
            .or_default()
            .push(record);
    }

    students
        .iter()
        .map(|student| {
            let mut student_records: Vec<AttendanceRecord> = by_student
                .get(student.id.as_str())
                .map(|matched| matched.iter().map(|record| (*record).clone()).collect())
                .unwrap_or_default();
            student_records.sort_by_key(|record| record.date);
            let counts = MonthCounts::tally(&student_records);
            StudentSummary {
                id: student.id.clone(),
                name: student.name.clone(),
                attendance_rate: counts.attendance_rate_label(),
                counts,
                records: student_records,
            }
        })
        .collect()
}
