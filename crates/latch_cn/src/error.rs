//! Error types for latch_cn

use latch_calendar::CalendarError;
use latch_core::FilterError;
use thiserror::Error;

/// Errors surfaced by widget APIs
///
/// Policy rejections (disabled option, full selection, out-of-bounds date) are
/// not errors; they come back as outcomes. These are faults the host has to
/// see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatchError {
    /// A custom filter failed; the keystroke was discarded
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Invalid date configuration or month navigation out of range
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

pub type Result<T> = std::result::Result<T, LatchError>;
