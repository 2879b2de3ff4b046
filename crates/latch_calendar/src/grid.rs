//! Month grid construction
//!
//! A month grid is a flat list of cells read row by row, 7 cells per row. It
//! starts with one blank cell per weekday between the configured week start
//! and the weekday of the 1st, followed by one cell per day of the month. The
//! last row is not padded; [`CalendarGrid::padded_to_six_weeks`] does that for
//! renderers that want a fixed-height grid.
//!
//! ```rust
//! use chrono::{NaiveDate, Weekday};
//! use latch_calendar::grid::build_month_grid;
//!
//! // March 2024 starts on a Friday
//! let anchor = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
//! let grid = build_month_grid(anchor, Weekday::Mon);
//!
//! assert_eq!(grid.leading_blanks(), 4);
//! assert_eq!(grid.cells.len(), 4 + 31);
//! assert_eq!(grid.cells[4], NaiveDate::from_ymd_opt(2024, 3, 1));
//! ```

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// Cells per row
pub const DAYS_PER_WEEK: usize = 7;

/// Cells in a six-week grid
pub const SIX_WEEKS: usize = DAYS_PER_WEEK * 6;

/// Day cells of one month
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarGrid {
    /// First day of the month
    pub month: NaiveDate,
    /// Weekday of the first column
    pub week_start: Weekday,
    /// Blank (`None`) leading cells, then every day of the month
    pub cells: Vec<Option<NaiveDate>>,
}

impl CalendarGrid {
    /// Number of blank cells before the 1st
    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_none()).count()
    }

    /// Number of day cells
    pub fn day_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Cells grouped into weeks; the last row may be short
    pub fn rows(&self) -> impl Iterator<Item = &[Option<NaiveDate>]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    pub fn row_count(&self) -> usize {
        self.cells.len().div_ceil(DAYS_PER_WEEK)
    }

    /// Cells padded with trailing blanks to exactly six weeks
    pub fn padded_to_six_weeks(&self) -> Vec<Option<NaiveDate>> {
        let mut cells = self.cells.clone();
        cells.resize(SIX_WEEKS.max(cells.len()), None);
        cells
    }

    /// Column headers in display order
    pub fn weekday_labels(&self) -> [Weekday; DAYS_PER_WEEK] {
        weekday_sequence(self.week_start)
    }
}

/// The seven weekdays beginning at `week_start`
pub fn weekday_sequence(week_start: Weekday) -> [Weekday; DAYS_PER_WEEK] {
    let mut days = [week_start; DAYS_PER_WEEK];
    for i in 1..DAYS_PER_WEEK {
        days[i] = days[i - 1].succ();
    }
    days
}

/// Number of days in the month containing `date`
///
/// The day before the 1st of the following month.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        // December of chrono's last representable year
        .unwrap_or_else(|| {
            (28..=31)
                .rev()
                .find(|&d| NaiveDate::from_ymd_opt(date.year(), date.month(), d).is_some())
                .unwrap_or(28)
        })
}

/// Build the grid for the month containing `anchor`
pub fn build_month_grid(anchor: NaiveDate, week_start: Weekday) -> CalendarGrid {
    let first = anchor.with_day(1).unwrap_or(anchor);
    let leading = (first.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    let days = days_in_month(first) as usize;

    let mut cells = Vec::with_capacity(leading as usize + days);
    cells.resize(leading as usize, None);
    cells.extend(first.iter_days().take(days).map(Some));

    tracing::trace!(month = %first, ?week_start, leading, days, "built month grid");

    CalendarGrid {
        month: first,
        week_start,
        cells,
    }
}
