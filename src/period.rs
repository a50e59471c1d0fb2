//! Calendar-month reporting periods.
//!
//! A period is always a whole calendar month. Bounds are inclusive calendar
//! dates, so a comparison against `last_day()` covers the whole final day.

use chrono::{Datelike, Days, Months, NaiveDate};
use thiserror::Error;

/// Errors raised when building a period from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
    #[error("year must be between {min} and {max}, got {0}", min = MIN_YEAR, max = MAX_YEAR)]
    YearOutOfRange(i32),
}

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// One calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportPeriod {
    first_day: NaiveDate,
}

impl ReportPeriod {
    /// Build a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or(PeriodError::MonthOutOfRange(month))
    }

    /// Build a period from a 0-based month (0 = January) and a year.
    ///
    /// Errors report the month 1-based, as `new` does.
    pub fn from_zero_based(month0: u32, year: i32) -> Result<Self, PeriodError> {
        if month0 > 11 {
            return Err(PeriodError::MonthOutOfRange(month0.saturating_add(1)));
        }
        Self::new(year, month0 + 1)
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day + Months::new(1) - Days::new(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day()
    }

    /// The month before this one, rolling the year over in January.
    pub fn previous(&self) -> Self {
        self.months_before(1)
    }

    pub fn months_before(&self, n: u32) -> Self {
        Self {
            first_day: self.first_day - Months::new(n),
        }
    }

    /// The `count` calendar months ending with the month of `anchor`, oldest first.
    pub fn trailing(anchor: NaiveDate, count: u32) -> Vec<Self> {
        let current = Self::containing(anchor);
        (0..count).rev().map(|i| current.months_before(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds() {
        let feb = ReportPeriod::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), date(2024, 2, 1));
        assert_eq!(feb.last_day(), date(2024, 2, 29));

        let dec = ReportPeriod::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), date(2023, 12, 31));
    }

    #[test]
    fn test_from_zero_based() {
        let jan = ReportPeriod::from_zero_based(0, 2024).unwrap();
        assert_eq!(jan.month(), 1);
        assert_eq!(jan.year(), 2024);

        assert_eq!(
            ReportPeriod::from_zero_based(12, 2024),
            Err(PeriodError::MonthOutOfRange(13))
        );
        assert_eq!(
            ReportPeriod::from_zero_based(u32::MAX, 2024),
            Err(PeriodError::MonthOutOfRange(u32::MAX))
        );
    }

    #[test]
    fn test_validation() {
        assert_eq!(ReportPeriod::new(2024, 0), Err(PeriodError::MonthOutOfRange(0)));
        assert_eq!(ReportPeriod::new(2024, 13), Err(PeriodError::MonthOutOfRange(13)));
        assert_eq!(ReportPeriod::new(1800, 5), Err(PeriodError::YearOutOfRange(1800)));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let jan = ReportPeriod::new(2024, 1).unwrap();
        assert!(jan.contains(date(2024, 1, 1)));
        assert!(jan.contains(date(2024, 1, 31)));
        assert!(!jan.contains(date(2023, 12, 31)));
        assert!(!jan.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_previous_rolls_over_year() {
        let jan = ReportPeriod::new(2024, 1).unwrap();
        let prev = jan.previous();
        assert_eq!(prev.year(), 2023);
        assert_eq!(prev.month(), 12);
    }

    #[test]
    fn test_containing() {
        let period = ReportPeriod::containing(date(2024, 3, 31));
        assert_eq!(period, ReportPeriod::new(2024, 3).unwrap());
    }

    #[test]
    fn test_trailing_window() {
        let months = ReportPeriod::trailing(date(2024, 3, 31), 12);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], ReportPeriod::new(2023, 4).unwrap());
        assert_eq!(months[11], ReportPeriod::new(2024, 3).unwrap());
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }
}
