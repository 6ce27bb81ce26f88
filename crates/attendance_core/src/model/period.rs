//! Calendar month key used for grouping and calendar materialization.

use crate::model::record::RecordValidationError;
use chrono::{Datelike, NaiveDate};
use std::fmt::{Display, Formatter};

/// One Gregorian calendar month, anchored on its first day.
///
/// Construction goes through chrono, so every key names a representable month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Builds a month key from a 1-based month number.
    ///
    /// # Errors
    /// - `InvalidMonth` when `month` is outside `1..=12`.
    /// - `InvalidYear` when the year is outside chrono's calendar range.
    pub fn new(year: i32, month: u32) -> Result<Self, RecordValidationError> {
        if !(1..=12).contains(&month) {
            return Err(RecordValidationError::InvalidMonth(month));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(RecordValidationError::InvalidYear(year))
    }

    /// Returns the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - chrono::Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days().last().unwrap_or(self.first)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Iterates every date of this month in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first.month();
        self.first
            .iter_days()
            .take_while(move |date| date.month() == month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::YearMonth;
    use crate::model::record::RecordValidationError;
    use chrono::NaiveDate;

    #[test]
    fn days_in_month_follows_gregorian_leap_rules() {
        let cases = [
            (2024, 2, 29),
            (2025, 2, 28),
            (1900, 2, 28),
            (2000, 2, 29),
            (2025, 3, 31),
            (2025, 4, 30),
            (2025, 12, 31),
        ];
        for (year, month, expected) in cases {
            let key = YearMonth::new(year, month).unwrap();
            assert_eq!(key.days_in_month(), expected, "{key}");
            assert_eq!(key.days().count() as u32, expected, "{key}");
        }
    }

    #[test]
    fn new_rejects_out_of_range_months() {
        assert!(matches!(
            YearMonth::new(2025, 0),
            Err(RecordValidationError::InvalidMonth(0))
        ));
        assert!(matches!(
            YearMonth::new(2025, 13),
            Err(RecordValidationError::InvalidMonth(13))
        ));
    }

    #[test]
    fn new_rejects_years_chrono_cannot_represent() {
        assert_eq!(
            YearMonth::new(300_000, 6),
            Err(RecordValidationError::InvalidYear(300_000))
        );
        assert_eq!(
            YearMonth::new(-300_000, 1),
            Err(RecordValidationError::InvalidYear(-300_000))
        );
    }

    #[test]
    fn of_anchors_on_first_day() {
        let key = YearMonth::of(NaiveDate::from_ymd_opt(2025, 6, 17).unwrap());
        assert_eq!(key, YearMonth::new(2025, 6).unwrap());
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(key.last_day(), NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn contains_checks_year_and_month() {
        let june = YearMonth::new(2025, 6).unwrap();
        assert!(june.contains(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()));
        assert!(!june.contains(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
        assert!(!june.contains(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(YearMonth::new(2025, 3).unwrap().to_string(), "2025-03");
    }
}
