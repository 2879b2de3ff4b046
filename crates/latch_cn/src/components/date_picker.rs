//! DatePicker component - calendar with single or range selection
//!
//! Shows one month at a time. Dates outside `[min_date, max_date]` render
//! disabled and ignore clicks. Range mode uses two clicks; the second click
//! may come before the first and the range is ordered.
//!
//! Presented inline (always visible) or as a popover behind a trigger. A
//! popover closes after a single-date commit or a completed range.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use latch_cn::prelude::*;
//!
//! let date = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
//!
//! let registry = dismiss_registry();
//! let mut stay = cn::date_picker(&registry)
//!     .range()
//!     .month(date(1))
//!     .min_date(date(5))
//!     .build()
//!     .unwrap();
//!
//! stay.click_date(date(20));
//! stay.click_date(date(12));
//! assert!(!stay.click_date(date(2)));
//!
//! let range = stay.range().unwrap();
//! assert_eq!((range.start, range.end), (Some(date(12)), Some(date(20))));
//! assert!(stay.view().cell(date(15)).unwrap().in_range);
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use latch_calendar::{
    DateBounds, DateRange, DateRangeSelector, MonthCursor, RangeOutcome, SingleDateSelector,
};
use latch_core::{Containment, Key, KeyEvent, NodeId, SingleSelection};
use latch_overlay::{CloseReason, DismissRegistry, OverlayDisclosure};

use crate::error::Result;
use crate::widget::{Widget, WidgetKind};

/// Single date or two-click range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSelectionMode {
    #[default]
    Single,
    Range,
}

/// Where the calendar is shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    #[default]
    Inline,
    /// Floating panel opened from a trigger
    Popover,
}

/// One day cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DayCellView {
    pub date: NaiveDate,
    pub day: u32,
    /// The single value, or a range endpoint
    pub selected: bool,
    /// Strictly between the range endpoints
    pub in_range: bool,
    pub disabled: bool,
}

/// View model for a [`DatePicker`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatePickerView {
    pub open: bool,
    pub disabled: bool,
    pub mode: DateSelectionMode,
    pub presentation: Presentation,
    /// e.g. "March 2024"
    pub month_label: String,
    /// Two-letter column headers
    pub weekdays: Vec<String>,
    /// Leading blanks are `None`
    pub cells: Vec<Option<DayCellView>>,
    pub value: Option<NaiveDate>,
    pub range: Option<DateRange>,
}

impl DatePickerView {
    /// Cell for `date`, if it is in the shown month
    pub fn cell(&self, date: NaiveDate) -> Option<&DayCellView> {
        self.cells.iter().flatten().find(|c| c.date == date)
    }
}

enum DateSelector {
    Single(SingleDateSelector),
    Range(DateRangeSelector),
}

struct DatePickerConfig {
    registry: DismissRegistry,
    mode: DateSelectionMode,
    presentation: Presentation,
    default_value: Option<NaiveDate>,
    value: Option<Arc<dyn Fn() -> Option<NaiveDate> + Send + Sync>>,
    default_range: DateRange,
    range_value: Option<Arc<dyn Fn() -> DateRange + Send + Sync>>,
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
    month: Option<NaiveDate>,
    week_start: Weekday,
    disabled: bool,
    anchor: Option<NodeId>,
    panel: Option<NodeId>,
    on_change: Option<Arc<dyn Fn(NaiveDate) + Send + Sync>>,
    on_range_change: Option<Arc<dyn Fn(&DateRange) + Send + Sync>>,
}

/// Builder for [`DatePicker`]
pub struct DatePickerBuilder {
    config: DatePickerConfig,
}

impl DatePickerBuilder {
    pub fn new(registry: &DismissRegistry) -> Self {
        Self {
            config: DatePickerConfig {
                registry: Arc::clone(registry),
                mode: DateSelectionMode::Single,
                presentation: Presentation::Inline,
                default_value: None,
                value: None,
                default_range: DateRange::EMPTY,
                range_value: None,
                min_date: None,
                max_date: None,
                month: None,
                week_start: Weekday::Mon,
                disabled: false,
                anchor: None,
                panel: None,
                on_change: None,
                on_range_change: None,
            },
        }
    }

    pub fn mode(mut self, mode: DateSelectionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Switch to range mode
    pub fn range(self) -> Self {
        self.mode(DateSelectionMode::Range)
    }

    pub fn presentation(mut self, presentation: Presentation) -> Self {
        self.config.presentation = presentation;
        self
    }

    /// Show the calendar in a popover
    pub fn popover(self) -> Self {
        self.presentation(Presentation::Popover)
    }

    pub fn default_value(mut self, date: NaiveDate) -> Self {
        self.config.default_value = Some(date);
        self
    }

    /// Read the single date from the host (controlled)
    pub fn value<F>(mut self, read: F) -> Self
    where
        F: Fn() -> Option<NaiveDate> + Send + Sync + 'static,
    {
        self.config.value = Some(Arc::new(read));
        self
    }

    pub fn default_range(mut self, range: DateRange) -> Self {
        self.config.default_range = range;
        self
    }

    /// Read the range from the host (controlled)
    pub fn range_value<F>(mut self, read: F) -> Self
    where
        F: Fn() -> DateRange + Send + Sync + 'static,
    {
        self.config.range_value = Some(Arc::new(read));
        self
    }

    /// Earliest selectable date (inclusive)
    pub fn min_date(mut self, date: NaiveDate) -> Self {
        self.config.min_date = Some(date);
        self
    }

    /// Latest selectable date (inclusive)
    pub fn max_date(mut self, date: NaiveDate) -> Self {
        self.config.max_date = Some(date);
        self
    }

    /// Month shown first; defaults to the value's month, else today's
    pub fn month(mut self, date: NaiveDate) -> Self {
        self.config.month = Some(date);
        self
    }

    /// First column of the grid (default Monday)
    pub fn week_start(mut self, weekday: Weekday) -> Self {
        self.config.week_start = weekday;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    pub fn anchor(mut self, node: NodeId) -> Self {
        self.config.anchor = Some(node);
        self
    }

    pub fn panel(mut self, node: NodeId) -> Self {
        self.config.panel = Some(node);
        self
    }

    /// Single-mode change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(NaiveDate) + Send + Sync + 'static,
    {
        self.config.on_change = Some(Arc::new(callback));
        self
    }

    /// Range-mode change callback, called on both clicks
    pub fn on_range_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DateRange) + Send + Sync + 'static,
    {
        self.config.on_range_change = Some(Arc::new(callback));
        self
    }

    /// Build the picker
    ///
    /// Fails when `min_date` is after `max_date`.
    pub fn build(self) -> Result<DatePicker> {
        let config = self.config;
        let bounds = DateBounds::new(config.min_date, config.max_date)?;

        let selector = match config.mode {
            DateSelectionMode::Single => {
                let mut selection = match config.value {
                    Some(read) => SingleSelection::controlled(move || read()),
                    None => SingleSelection::uncontrolled(config.default_value),
                };
                if let Some(cb) = config.on_change {
                    selection = selection.on_change(move |d: &NaiveDate| cb(*d));
                }
                DateSelector::Single(SingleDateSelector::new(selection).bounds(bounds))
            }
            DateSelectionMode::Range => {
                let mut selector = match config.range_value {
                    Some(read) => DateRangeSelector::controlled(move || read()),
                    None => DateRangeSelector::uncontrolled(config.default_range),
                };
                if let Some(cb) = config.on_range_change {
                    selector = selector.on_change(move |r: &DateRange| cb(r));
                }
                DateSelector::Range(selector.bounds(bounds))
            }
        };

        let disclosure = match config.presentation {
            Presentation::Inline => None,
            Presentation::Popover => {
                let mut disclosure =
                    OverlayDisclosure::new(config.registry).label("date_picker");
                if let Some(node) = config.anchor {
                    disclosure = disclosure.anchor(node);
                }
                if let Some(node) = config.panel {
                    disclosure = disclosure.panel(node);
                }
                Some(disclosure)
            }
        };

        let mut picker = DatePicker {
            selector,
            cursor: MonthCursor::default(),
            week_start: config.week_start,
            disabled: config.disabled,
            disclosure,
        };
        let initial = config.month.or_else(|| picker.anchor_date());
        if let Some(date) = initial {
            picker.cursor.show(date);
        }
        Ok(picker)
    }
}

/// Create a date picker builder
pub fn date_picker(registry: &DismissRegistry) -> DatePickerBuilder {
    DatePickerBuilder::new(registry)
}

/// Calendar date picker
pub struct DatePicker {
    selector: DateSelector,
    cursor: MonthCursor,
    week_start: Weekday,
    disabled: bool,
    /// Present in popover mode only
    disclosure: Option<OverlayDisclosure>,
}

impl DatePicker {
    pub fn mode(&self) -> DateSelectionMode {
        match self.selector {
            DateSelector::Single(_) => DateSelectionMode::Single,
            DateSelector::Range(_) => DateSelectionMode::Range,
        }
    }

    pub fn presentation(&self) -> Presentation {
        if self.disclosure.is_some() {
            Presentation::Popover
        } else {
            Presentation::Inline
        }
    }

    /// Selected date (single mode)
    pub fn value(&self) -> Option<NaiveDate> {
        match self.selector {
            DateSelector::Single(ref s) => s.read(),
            DateSelector::Range(_) => None,
        }
    }

    /// Selected range (range mode)
    pub fn range(&self) -> Option<DateRange> {
        match self.selector {
            DateSelector::Single(_) => None,
            DateSelector::Range(ref r) => Some(r.read()),
        }
    }

    pub fn month(&self) -> MonthCursor {
        self.cursor
    }

    pub fn bounds(&self) -> DateBounds {
        match self.selector {
            DateSelector::Single(ref s) => s.date_bounds(),
            DateSelector::Range(ref r) => r.date_bounds(),
        }
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        !self.disabled && self.bounds().contains(date)
    }

    /// Day clicked
    ///
    /// Returns whether the selection changed. A closed popover ignores
    /// clicks; a commit that finishes the selection closes it.
    pub fn click_date(&mut self, date: NaiveDate) -> bool {
        if self.disabled || !self.is_open() {
            return false;
        }
        let finished = match self.selector {
            DateSelector::Single(ref mut s) => {
                if !s.click(date).is_committed() {
                    return false;
                }
                true
            }
            DateSelector::Range(ref mut r) => match r.click(date) {
                RangeOutcome::Started => false,
                RangeOutcome::Completed => true,
                RangeOutcome::Rejected(_) => return false,
            },
        };
        if finished {
            if let Some(ref mut disclosure) = self.disclosure {
                disclosure.close(CloseReason::Commit);
            }
        }
        true
    }

    /// Reset a range selection
    pub fn clear_range(&mut self) -> bool {
        match self.selector {
            DateSelector::Range(ref mut r) if !self.disabled => r.clear(),
            _ => false,
        }
    }

    pub fn prev_month(&mut self) -> Result<bool> {
        if self.disabled {
            return Ok(false);
        }
        self.cursor.prev()?;
        Ok(true)
    }

    pub fn next_month(&mut self) -> Result<bool> {
        if self.disabled {
            return Ok(false);
        }
        self.cursor.next()?;
        Ok(true)
    }

    /// Jump to the month containing `date`
    pub fn show_month(&mut self, date: NaiveDate) {
        self.cursor.show(date);
    }

    /// Popover trigger clicked
    ///
    /// Opening shows the month of the current selection.
    pub fn click_trigger(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        let anchor = self.anchor_date();
        let Some(ref mut disclosure) = self.disclosure else {
            return false;
        };
        if disclosure.is_open() {
            return disclosure.close(CloseReason::Explicit);
        }
        let opened = disclosure.open();
        if opened {
            if let Some(date) = anchor {
                self.cursor.show(date);
            }
        }
        opened
    }

    fn anchor_date(&self) -> Option<NaiveDate> {
        match self.selector {
            DateSelector::Single(ref s) => s.read(),
            DateSelector::Range(ref r) => r.read().start,
        }
    }

    fn cell_view(&self, date: NaiveDate) -> DayCellView {
        let (selected, in_range) = match self.selector {
            DateSelector::Single(ref s) => (s.is_selected(date), false),
            DateSelector::Range(ref r) => {
                let range = r.read();
                (range.is_endpoint(date), range.in_range(date))
            }
        };
        DayCellView {
            date,
            day: date.day(),
            selected,
            in_range,
            disabled: !self.is_selectable(date),
        }
    }
}

impl fmt::Debug for DatePicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DatePicker");
        match self.selector {
            DateSelector::Single(ref single) => s.field("selector", single),
            DateSelector::Range(ref range) => s.field("selector", range),
        };
        s.field("cursor", &self.cursor)
            .field("week_start", &self.week_start)
            .field("disabled", &self.disabled)
            .field("disclosure", &self.disclosure)
            .finish()
    }
}

impl Widget for DatePicker {
    type View = DatePickerView;

    fn kind(&self) -> WidgetKind {
        WidgetKind::DatePicker
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool> {
        let Some(ref mut disclosure) = self.disclosure else {
            return Ok(false);
        };
        disclosure.sync();
        Ok(event.key == Key::Escape && disclosure.handle_escape())
    }

    fn handle_pointer_down(&mut self, target: NodeId, containment: &dyn Containment) -> bool {
        match self.disclosure {
            Some(ref mut disclosure) => disclosure.handle_pointer_down(target, containment),
            None => false,
        }
    }

    /// Inline calendars are always shown
    fn is_open(&self) -> bool {
        self.disclosure.as_ref().map_or(true, |d| d.is_open())
    }

    fn view(&self) -> DatePickerView {
        let grid = self.cursor.grid(self.week_start);
        DatePickerView {
            open: self.is_open(),
            disabled: self.disabled,
            mode: self.mode(),
            presentation: self.presentation(),
            month_label: self.cursor.first_day().format("%B %Y").to_string(),
            weekdays: grid
                .weekday_labels()
                .iter()
                .map(|wd| wd.to_string().chars().take(2).collect())
                .collect(),
            cells: grid
                .cells
                .iter()
                .map(|cell| cell.map(|date| self.cell_view(date)))
                .collect(),
            value: self.value(),
            range: self.range(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recorder, Host};
    use crate::LatchError;
    use latch_calendar::CalendarError;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_single_selection() {
        let host = Host::new();
        let (log, cb) = recorder::<NaiveDate>();
        let mut picker = date_picker(&host.registry)
            .month(d(2024, 2, 1))
            .on_change(move |date| cb(&date))
            .build()
            .unwrap();

        assert!(picker.click_date(d(2024, 2, 29)));
        assert_eq!(picker.value(), Some(d(2024, 2, 29)));
        assert_eq!(*log.lock().unwrap(), vec![d(2024, 2, 29)]);

        let view = picker.view();
        assert_eq!(view.month_label, "February 2024");
        assert!(view.cell(d(2024, 2, 29)).unwrap().selected);
        assert!(!view.cell(d(2024, 2, 28)).unwrap().selected);
        assert_eq!(view.range, None);
    }

    #[test]
    fn test_grid_layout_monday_and_sunday() {
        let host = Host::new();
        // March 2024 starts on a Friday
        let monday = date_picker(&host.registry)
            .month(d(2024, 3, 10))
            .build()
            .unwrap()
            .view();
        assert_eq!(monday.weekdays, vec!["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]);
        assert_eq!(monday.cells.iter().take_while(|c| c.is_none()).count(), 4);
        assert_eq!(monday.cells.iter().flatten().count(), 31);

        let sunday = date_picker(&host.registry)
            .month(d(2024, 3, 10))
            .week_start(Weekday::Sun)
            .build()
            .unwrap()
            .view();
        assert_eq!(sunday.weekdays[0], "Su");
        assert_eq!(sunday.cells.iter().take_while(|c| c.is_none()).count(), 5);
    }

    #[test]
    fn test_range_clicks() {
        let host = Host::new();
        let (log, cb) = recorder::<DateRange>();
        let mut picker = date_picker(&host.registry)
            .range()
            .month(d(2024, 6, 1))
            .on_range_change(cb)
            .build()
            .unwrap();

        picker.click_date(d(2024, 6, 20));
        picker.click_date(d(2024, 6, 10));
        assert_eq!(
            picker.range(),
            Some(DateRange::between(d(2024, 6, 10), d(2024, 6, 20)))
        );

        let view = picker.view();
        let cell = |day| *view.cell(d(2024, 6, day)).unwrap();
        assert!(cell(10).selected && !cell(10).in_range);
        assert!(cell(15).in_range && !cell(15).selected);
        assert!(cell(20).selected);
        assert!(!cell(21).in_range);

        // Third click starts over
        picker.click_date(d(2024, 6, 5));
        assert_eq!(picker.range(), Some(DateRange::pending(d(2024, 6, 5))));
        assert_eq!(log.lock().unwrap().len(), 3);

        assert!(picker.clear_range());
        assert_eq!(picker.range(), Some(DateRange::EMPTY));
    }

    #[test]
    fn test_bounds_disable_dates() {
        let host = Host::new();
        let (log, cb) = recorder::<DateRange>();
        let mut picker = date_picker(&host.registry)
            .range()
            .month(d(2024, 6, 1))
            .min_date(d(2024, 6, 5))
            .max_date(d(2024, 6, 25))
            .on_range_change(cb)
            .build()
            .unwrap();

        picker.click_date(d(2024, 6, 10));
        assert!(!picker.click_date(d(2024, 6, 26)));
        assert_eq!(picker.range(), Some(DateRange::pending(d(2024, 6, 10))));
        assert_eq!(log.lock().unwrap().len(), 1);

        let view = picker.view();
        assert!(view.cell(d(2024, 6, 4)).unwrap().disabled);
        assert!(!view.cell(d(2024, 6, 5)).unwrap().disabled);
        assert!(!view.cell(d(2024, 6, 25)).unwrap().disabled);
        assert!(view.cell(d(2024, 6, 26)).unwrap().disabled);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let host = Host::new();
        let err = date_picker(&host.registry)
            .min_date(d(2024, 6, 30))
            .max_date(d(2024, 6, 1))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LatchError::Calendar(CalendarError::InvertedBounds {
                min: d(2024, 6, 30),
                max: d(2024, 6, 1),
            })
        );
    }

    #[test]
    fn test_month_navigation() {
        let host = Host::new();
        let mut picker = date_picker(&host.registry)
            .default_value(d(2024, 12, 25))
            .build()
            .unwrap();
        assert_eq!(picker.view().month_label, "December 2024");

        assert!(picker.next_month().unwrap());
        assert_eq!(picker.view().month_label, "January 2025");
        picker.prev_month().unwrap();
        picker.prev_month().unwrap();
        assert_eq!(picker.view().month_label, "November 2024");
        // Selection is untouched by navigation
        assert_eq!(picker.value(), Some(d(2024, 12, 25)));
    }

    #[test]
    fn test_popover_closes_on_completion() {
        let host = Host::new();
        let mut picker = date_picker(&host.registry)
            .range()
            .popover()
            .month(d(2024, 6, 1))
            .anchor(host.trigger)
            .panel(host.panel)
            .build()
            .unwrap();
        assert!(!picker.is_open());

        assert!(picker.click_trigger());
        picker.click_date(d(2024, 6, 3));
        assert!(picker.is_open());
        picker.click_date(d(2024, 6, 7));
        assert!(!picker.is_open());
        assert_eq!(host.registry_listeners(), 0);
    }

    #[test]
    fn test_closed_popover_ignores_clicks() {
        let host = Host::new();
        let (log, cb) = recorder::<NaiveDate>();
        let mut picker = date_picker(&host.registry)
            .popover()
            .month(d(2024, 6, 1))
            .anchor(host.trigger)
            .panel(host.panel)
            .on_change(move |date| cb(&date))
            .build()
            .unwrap();

        assert!(!picker.click_date(d(2024, 6, 3)));
        assert_eq!(picker.value(), None);
        assert!(log.lock().unwrap().is_empty());

        picker.click_trigger();
        assert!(picker.click_date(d(2024, 6, 3)));
        assert!(!picker.is_open());
        assert!(!picker.click_date(d(2024, 6, 4)));
        assert_eq!(picker.value(), Some(d(2024, 6, 3)));
    }

    #[test]
    fn test_popover_reopens_on_selected_month() {
        let host = Host::new();
        let mut picker = date_picker(&host.registry)
            .popover()
            .default_value(d(2024, 1, 15))
            .anchor(host.trigger)
            .panel(host.panel)
            .build()
            .unwrap();

        picker.click_trigger();
        picker.next_month().unwrap();
        picker.next_month().unwrap();
        assert!(picker.handle_pointer_down(host.outside, &host.tree));

        picker.click_trigger();
        assert_eq!(picker.view().month_label, "January 2024");
        assert!(picker.handle_key(&KeyEvent::named("Escape")).unwrap());
        assert!(!picker.is_open());
    }

    #[test]
    fn test_inline_is_always_open() {
        let host = Host::new();
        let mut picker = date_picker(&host.registry)
            .month(d(2024, 6, 1))
            .build()
            .unwrap();

        assert!(picker.is_open());
        assert!(!picker.click_trigger());
        assert!(!picker.handle_key(&KeyEvent::named("Escape")).unwrap());
        assert!(!picker.handle_pointer_down(host.outside, &host.tree));
    }

    #[test]
    fn test_disabled_picker() {
        let host = Host::new();
        let mut picker = date_picker(&host.registry)
            .month(d(2024, 6, 1))
            .disabled(true)
            .build()
            .unwrap();

        assert!(!picker.click_date(d(2024, 6, 3)));
        assert!(!picker.next_month().unwrap());
        assert!(picker.view().cell(d(2024, 6, 3)).unwrap().disabled);
    }
}
