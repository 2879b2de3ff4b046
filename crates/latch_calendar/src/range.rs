//! Date selection: two-click ranges and single dates
//!
//! Range clicks follow a three-phase cycle:
//!
//! | Range | Click `d` | Next |
//! |---|---|---|
//! | empty | any | `(d, -)` |
//! | `(s, -)` | any | `(min(s, d), max(s, d))` |
//! | `(s, e)` | any | `(d, -)` |
//!
//! Clicks outside `[min, max]` do nothing at all: the range stays where it
//! was and no callback runs. `start <= end` holds whenever both are set.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use latch_core::{
    ChangeCallback, CommitOutcome, RejectReason, SingleSelection, StateTransitions, ValueSource,
};

use crate::error::CalendarError;

// ============================================================================
// DateBounds
// ============================================================================

/// Inclusive selectable date range; either end may be open
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DateBounds {
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
}

impl DateBounds {
    pub fn new(min: Option<NaiveDate>, max: Option<NaiveDate>) -> Result<Self, CalendarError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(CalendarError::InvertedBounds { min, max });
            }
        }
        Ok(Self { min, max })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn min(&self) -> Option<NaiveDate> {
        self.min
    }

    pub fn max(&self) -> Option<NaiveDate> {
        self.max
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min.map_or(true, |min| date >= min) && self.max.map_or(true, |max| date <= max)
    }
}

// ============================================================================
// DateRange
// ============================================================================

/// Where a range is in its click cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePhase {
    #[default]
    Empty,
    /// Start chosen, waiting for the second click
    Pending,
    Complete,
}

/// Range machine events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeEvent {
    Click,
    Clear,
}

impl StateTransitions for RangePhase {
    type Event = RangeEvent;

    fn on_event(&self, event: RangeEvent) -> Option<Self> {
        use RangePhase::*;

        match (self, event) {
            (Empty, RangeEvent::Click) => Some(Pending),
            (Pending, RangeEvent::Click) => Some(Complete),
            (Complete, RangeEvent::Click) => Some(Pending),
            (Pending | Complete, RangeEvent::Clear) => Some(Empty),
            _ => None,
        }
    }
}

/// A possibly-partial date range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const EMPTY: DateRange = DateRange {
        start: None,
        end: None,
    };

    /// Range with only a start
    pub fn pending(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Complete range; the endpoints may be given in either order
    pub fn between(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: Some(a.min(b)),
            end: Some(a.max(b)),
        }
    }

    pub fn phase(&self) -> RangePhase {
        match (self.start, self.end) {
            (Some(_), Some(_)) => RangePhase::Complete,
            (Some(_), None) => RangePhase::Pending,
            // An end without a start never comes out of `click`; treat it as empty
            (None, _) => RangePhase::Empty,
        }
    }

    /// The range after clicking `date`
    pub fn clicked(self, date: NaiveDate) -> Self {
        match (self.phase(), self.start) {
            (RangePhase::Pending, Some(start)) => Self::between(start, date),
            _ => Self::pending(date),
        }
    }

    /// Strictly between start and end
    pub fn in_range(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start < date && date < end,
            _ => false,
        }
    }

    pub fn is_endpoint(&self, date: NaiveDate) -> bool {
        self.start == Some(date) || self.end == Some(date)
    }

    /// Inclusive containment (endpoints count)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.is_endpoint(date) || self.in_range(date)
    }

    /// Inclusive length in days of a complete range
    pub fn len_days(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{start} - {end}"),
            (Some(start), None) => write!(f, "{start} - ..."),
            _ => Ok(()),
        }
    }
}

/// Result of a date click
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOutcome {
    /// Range now has a start only
    Started,
    /// Range now has both ends
    Completed,
    /// Nothing changed and no callback ran
    Rejected(RejectReason),
}

// ============================================================================
// DateRangeSelector
// ============================================================================

/// Two-click range selection with optional bounds
pub struct DateRangeSelector {
    source: ValueSource<DateRange>,
    bounds: DateBounds,
    on_change: Option<ChangeCallback<DateRange>>,
}

impl DateRangeSelector {
    pub fn uncontrolled(default: DateRange) -> Self {
        Self::from_source(ValueSource::owned(default))
    }

    pub fn controlled<F>(read: F) -> Self
    where
        F: Fn() -> DateRange + Send + Sync + 'static,
    {
        Self::from_source(ValueSource::external(read))
    }

    pub fn from_source(source: ValueSource<DateRange>) -> Self {
        Self {
            source,
            bounds: DateBounds::unbounded(),
            on_change: None,
        }
    }

    pub fn bounds(mut self, bounds: DateBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DateRange) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn read(&self) -> DateRange {
        self.source.read()
    }

    pub fn date_bounds(&self) -> DateBounds {
        self.bounds
    }

    pub fn is_controlled(&self) -> bool {
        self.source.is_controlled()
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        self.bounds.contains(date)
    }

    pub fn in_range(&self, date: NaiveDate) -> bool {
        self.read().in_range(date)
    }

    pub fn is_endpoint(&self, date: NaiveDate) -> bool {
        self.read().is_endpoint(date)
    }

    /// Click a date
    pub fn click(&mut self, date: NaiveDate) -> RangeOutcome {
        if !self.bounds.contains(date) {
            tracing::trace!(%date, "date outside bounds");
            return RangeOutcome::Rejected(RejectReason::OutOfBounds);
        }

        let current = self.read();
        let next = current.clicked(date);
        debug_assert_eq!(current.phase().on_event(RangeEvent::Click), Some(next.phase()));

        self.publish(next);
        match next.phase() {
            RangePhase::Complete => RangeOutcome::Completed,
            _ => RangeOutcome::Started,
        }
    }

    /// Reset to the empty range
    pub fn clear(&mut self) -> bool {
        if self.read().phase().on_event(RangeEvent::Clear).is_none() {
            return false;
        }
        self.publish(DateRange::EMPTY);
        true
    }

    fn publish(&mut self, next: DateRange) {
        self.source.write(next);
        if let Some(ref cb) = self.on_change {
            cb(&next);
        }
    }
}

impl Default for DateRangeSelector {
    fn default() -> Self {
        Self::uncontrolled(DateRange::EMPTY)
    }
}

impl fmt::Debug for DateRangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateRangeSelector")
            .field("source", &self.source)
            .field("bounds", &self.bounds)
            .finish()
    }
}

// ============================================================================
// SingleDateSelector
// ============================================================================

/// One selected date with optional bounds
#[derive(Debug)]
pub struct SingleDateSelector {
    selection: SingleSelection<NaiveDate>,
    bounds: DateBounds,
}

impl SingleDateSelector {
    pub fn new(selection: SingleSelection<NaiveDate>) -> Self {
        Self {
            selection,
            bounds: DateBounds::unbounded(),
        }
    }

    pub fn bounds(mut self, bounds: DateBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn read(&self) -> Option<NaiveDate> {
        self.selection.read()
    }

    pub fn date_bounds(&self) -> DateBounds {
        self.bounds
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        self.bounds.contains(date)
    }

    pub fn is_selected(&self, date: NaiveDate) -> bool {
        self.selection.is_selected(&date)
    }

    /// Click a date
    pub fn click(&mut self, date: NaiveDate) -> CommitOutcome {
        if !self.bounds.contains(date) {
            tracing::trace!(%date, "date outside bounds");
            return CommitOutcome::Rejected(RejectReason::OutOfBounds);
        }
        self.selection.commit(date)
    }
}

impl Default for SingleDateSelector {
    fn default() -> Self {
        Self::new(SingleSelection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_two_clicks_order_endpoints() {
        let mut sel = DateRangeSelector::default();

        assert_eq!(sel.click(d(20)), RangeOutcome::Started);
        assert_eq!(sel.read(), DateRange::pending(d(20)));

        assert_eq!(sel.click(d(10)), RangeOutcome::Completed);
        assert_eq!(sel.read(), DateRange::between(d(10), d(20)));
        assert_eq!(sel.read().start, Some(d(10)));
    }

    #[test]
    fn test_ordering_holds_for_every_pair() {
        for a in 1..=31 {
            for b in 1..=31 {
                let range = DateRange::EMPTY.clicked(d(a)).clicked(d(b));
                assert!(range.start <= range.end, "{a} {b}");
                assert_eq!(range.phase(), RangePhase::Complete);
            }
        }
    }

    #[test]
    fn test_third_click_restarts() {
        let mut sel = DateRangeSelector::uncontrolled(DateRange::between(d(1), d(5)));
        assert_eq!(sel.click(d(9)), RangeOutcome::Started);
        assert_eq!(sel.read(), DateRange::pending(d(9)));
    }

    #[test]
    fn test_same_day_twice() {
        let range = DateRange::EMPTY.clicked(d(3)).clicked(d(3));
        assert_eq!(range, DateRange::between(d(3), d(3)));
        assert_eq!(range.len_days(), Some(1));
        assert!(!range.in_range(d(3)));
        assert!(range.contains(d(3)));
    }

    #[test]
    fn test_in_range_is_strict() {
        let range = DateRange::between(d(10), d(14));
        assert!(!range.in_range(d(10)));
        assert!(range.in_range(d(11)));
        assert!(range.in_range(d(13)));
        assert!(!range.in_range(d(14)));
        assert!(range.is_endpoint(d(14)));
        assert!(!DateRange::pending(d(10)).in_range(d(11)));
    }

    #[test]
    fn test_out_of_bounds_is_silent() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let bounds = DateBounds::new(Some(d(5)), Some(d(25))).unwrap();
        let mut sel = DateRangeSelector::default()
            .bounds(bounds)
            .on_change(move |_| *counter.lock().unwrap() += 1);

        sel.click(d(10));
        assert_eq!(
            sel.click(d(30)),
            RangeOutcome::Rejected(RejectReason::OutOfBounds)
        );
        assert_eq!(sel.read(), DateRange::pending(d(10)));
        assert_eq!(*calls.lock().unwrap(), 1);

        assert!(sel.is_selectable(d(5)));
        assert!(sel.is_selectable(d(25)));
        assert!(!sel.is_selectable(d(4)));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert_eq!(
            DateBounds::new(Some(d(20)), Some(d(10))),
            Err(CalendarError::InvertedBounds {
                min: d(20),
                max: d(10)
            })
        );
        assert!(DateBounds::new(Some(d(10)), None).is_ok());
    }

    #[test]
    fn test_controlled_range_reports_proposal() {
        let host = Arc::new(Mutex::new(DateRange::pending(d(8))));
        let read = Arc::clone(&host);
        let proposals = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&proposals);

        let mut sel = DateRangeSelector::controlled(move || *read.lock().unwrap())
            .on_change(move |r| sink.lock().unwrap().push(*r));

        sel.click(d(2));
        assert_eq!(sel.read(), DateRange::pending(d(8)));
        assert_eq!(
            *proposals.lock().unwrap(),
            vec![DateRange::between(d(2), d(8))]
        );
    }

    #[test]
    fn test_clear() {
        let mut sel = DateRangeSelector::uncontrolled(DateRange::pending(d(1)));
        assert!(sel.clear());
        assert!(!sel.clear());
        assert_eq!(sel.read().phase(), RangePhase::Empty);
    }

    #[test]
    fn test_single_date_bounds() {
        let bounds = DateBounds::new(None, Some(d(15))).unwrap();
        let mut sel = SingleDateSelector::default().bounds(bounds);

        assert_eq!(sel.click(d(16)), CommitOutcome::Rejected(RejectReason::OutOfBounds));
        assert_eq!(sel.read(), None);
        assert_eq!(sel.click(d(15)), CommitOutcome::Selected);
        assert!(sel.is_selected(d(15)));
    }

    #[test]
    fn test_phase_transitions() {
        assert_eq!(RangePhase::Empty.on_event(RangeEvent::Click), Some(RangePhase::Pending));
        assert_eq!(RangePhase::Complete.on_event(RangeEvent::Click), Some(RangePhase::Pending));
        assert_eq!(RangePhase::Empty.on_event(RangeEvent::Clear), None);
    }
}
