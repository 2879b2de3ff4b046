//! Visible month
//!
//! A date picker shows one month at a time. [`MonthCursor`] stores that month
//! as its first day and moves it by whole months.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::CalendarError;
use crate::grid::{build_month_grid, CalendarGrid};

/// The month a calendar is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    /// Cursor on the month containing `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn from_ym(year: i32, month: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(CalendarError::MonthOutOfRange { year, month })
    }

    /// Cursor on the current local month
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Check if `date` falls in this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub fn next(&mut self) -> Result<(), CalendarError> {
        self.first = self
            .first
            .checked_add_months(Months::new(1))
            .ok_or(self.out_of_range(1))?;
        Ok(())
    }

    pub fn prev(&mut self) -> Result<(), CalendarError> {
        self.first = self
            .first
            .checked_sub_months(Months::new(1))
            .ok_or(self.out_of_range(-1))?;
        Ok(())
    }

    /// Jump to the month containing `date`
    pub fn show(&mut self, date: NaiveDate) {
        *self = Self::new(date);
    }

    pub fn grid(&self, week_start: Weekday) -> CalendarGrid {
        build_month_grid(self.first, week_start)
    }

    fn out_of_range(&self, delta: i32) -> CalendarError {
        let index = self.year() * 12 + self.month() as i32 - 1 + delta;
        CalendarError::MonthOutOfRange {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl Default for MonthCursor {
    fn default() -> Self {
        Self::today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_rollover() {
        let mut cursor = MonthCursor::from_ym(2024, 12).unwrap();
        cursor.next().unwrap();
        assert_eq!((cursor.year(), cursor.month()), (2025, 1));

        cursor.prev().unwrap();
        cursor.prev().unwrap();
        assert_eq!((cursor.year(), cursor.month()), (2024, 11));
    }

    #[test]
    fn test_new_normalizes_to_first() {
        let cursor = MonthCursor::new(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(cursor.first_day(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(cursor.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(!cursor.contains(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()));
    }

    #[test]
    fn test_navigation_past_chrono_range() {
        let mut cursor = MonthCursor::new(NaiveDate::MAX);
        let err = cursor.next().unwrap_err();
        assert!(matches!(err, CalendarError::MonthOutOfRange { .. }));
        assert_eq!(cursor.first_day().year(), NaiveDate::MAX.year());

        assert!(MonthCursor::from_ym(2024, 13).is_err());
    }
}
