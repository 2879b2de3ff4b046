//! Latch Calendar
//!
//! Date logic for the date picker:
//!
//! - **Grid**: month -> flat list of day cells with leading blanks
//! - **Month**: the visible month and previous/next navigation
//! - **Range**: two-click range selection, single-date selection, min/max bounds
//!
//! Weeks start on Monday unless the caller passes another [`chrono::Weekday`].
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, Weekday};
//! use latch_calendar::{DateRangeSelector, MonthCursor};
//!
//! let may = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! let mut cursor = MonthCursor::new(may);
//! let grid = cursor.grid(Weekday::Mon);
//! assert_eq!(grid.day_count(), 31);
//!
//! let mut range = DateRangeSelector::default();
//! range.click(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
//! range.click(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
//! assert!(range.in_range(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()));
//!
//! cursor.next().unwrap();
//! assert_eq!(cursor.month(), 6);
//! ```

pub mod error;
pub mod grid;
pub mod month;
pub mod range;

pub use error::CalendarError;
pub use grid::{build_month_grid, days_in_month, weekday_sequence, CalendarGrid};
pub use month::MonthCursor;
pub use range::{
    DateBounds, DateRange, DateRangeSelector, RangeEvent, RangeOutcome, RangePhase,
    SingleDateSelector,
};
