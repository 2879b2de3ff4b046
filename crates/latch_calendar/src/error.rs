//! Error types for latch_calendar

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// `min_date` is after `max_date`
    #[error("minimum date {min} is after maximum date {max}")]
    InvertedBounds { min: NaiveDate, max: NaiveDate },

    /// Month navigation left the range chrono can represent
    #[error("month {year}-{month:02} is outside the supported calendar range")]
    MonthOutOfRange { year: i32, month: u32 },
}
