//! MultiSelect component - several values with chips
//!
//! Rows toggle membership and the panel stays open. With a `max`, unselected
//! rows render disabled once the cap is reached and further adds are refused
//! without notifying.
//!
//! # Example
//!
//! ```rust
//! use latch_cn::prelude::*;
//!
//! let registry = dismiss_registry();
//! let mut tags = cn::multi_select(&registry)
//!     .option("rust", "Rust")
//!     .option("go", "Go")
//!     .option("zig", "Zig")
//!     .max(2)
//!     .show_count(true)
//!     .build();
//!
//! tags.click_trigger();
//! tags.click_option(0);
//! tags.click_option(2);
//! assert!(!tags.click_option(1));
//!
//! assert!(tags.is_open());
//! assert_eq!(tags.view().badge.as_deref(), Some("2 / 2"));
//! ```

use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;

use latch_core::{
    CommitOutcome, Containment, Key, KeyEvent, MultiSelection, NavigationOutcome, NodeId,
    OptionFilter, ReadFn, SelectOption,
};
use latch_overlay::{CloseReason, DismissRegistry, OverlayDisclosure};

use super::listbox::{Listbox, OptionRowView};
use crate::error::Result;
use crate::widget::{Widget, WidgetKind};

/// A selected value shown in the trigger
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChipView {
    pub value: String,
    pub label: String,
}

/// View model for a [`MultiSelect`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MultiSelectView {
    pub open: bool,
    pub disabled: bool,
    pub values: Vec<String>,
    pub chips: Vec<ChipView>,
    /// `"n"` or `"n / max"` when counting is on and something is selected
    pub badge: Option<String>,
    pub placeholder: Option<String>,
    pub searchable: bool,
    pub search: String,
    pub focus_index: isize,
    pub rows: Vec<OptionRowView>,
}

struct MultiSelectConfig {
    registry: DismissRegistry,
    options: Vec<SelectOption>,
    default_values: Vec<String>,
    values: Option<ReadFn<IndexSet<String>>>,
    max: Option<usize>,
    searchable: bool,
    show_count: bool,
    placeholder: Option<String>,
    disabled: bool,
    filter: OptionFilter,
    anchor: Option<NodeId>,
    panel: Option<NodeId>,
    on_change: Option<Arc<dyn Fn(&IndexSet<String>) + Send + Sync>>,
}

/// Builder for [`MultiSelect`]
pub struct MultiSelectBuilder {
    config: MultiSelectConfig,
}

impl MultiSelectBuilder {
    pub fn new(registry: &DismissRegistry) -> Self {
        Self {
            config: MultiSelectConfig {
                registry: Arc::clone(registry),
                options: Vec::new(),
                default_values: Vec::new(),
                values: None,
                max: None,
                searchable: true,
                show_count: false,
                placeholder: None,
                disabled: false,
                filter: OptionFilter::Label,
                anchor: None,
                panel: None,
                on_change: None,
            },
        }
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.config.options.push(SelectOption::new(value, label));
        self
    }

    pub fn option_disabled(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.config
            .options
            .push(SelectOption::new(value, label).disabled());
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.config.options.extend(options);
        self
    }

    /// Initially selected values (uncontrolled)
    pub fn default_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.default_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Read the selected set from the host (controlled)
    pub fn values<F>(mut self, read: F) -> Self
    where
        F: Fn() -> IndexSet<String> + Send + Sync + 'static,
    {
        self.config.values = Some(Arc::new(read));
        self
    }

    /// Maximum number of selected values
    pub fn max(mut self, max: usize) -> Self {
        self.config.max = Some(max);
        self
    }

    /// Show the search input (default true)
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.config.searchable = searchable;
        self
    }

    /// Show the selected count badge
    pub fn show_count(mut self, show: bool) -> Self {
        self.config.show_count = show;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.placeholder = Some(placeholder.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    pub fn filter(mut self, filter: OptionFilter) -> Self {
        self.config.filter = filter;
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

    /// Set the callback receiving the full selected set after each change
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&IndexSet<String>) + Send + Sync + 'static,
    {
        self.config.on_change = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> MultiSelect {
        let config = self.config;

        let mut selection = match config.values {
            Some(read) => MultiSelection::controlled(move || read()),
            None => MultiSelection::uncontrolled(config.default_values),
        }
        .with_max(config.max);
        if let Some(cb) = config.on_change {
            selection = selection.on_change(move |set: &IndexSet<String>| cb(set));
        }

        let mut disclosure = OverlayDisclosure::new(config.registry).label("multi_select");
        if let Some(node) = config.anchor {
            disclosure = disclosure.anchor(node);
        }
        if let Some(node) = config.panel {
            disclosure = disclosure.panel(node);
        }

        MultiSelect {
            selection,
            listbox: Listbox::new(config.options, config.filter),
            disclosure,
            searchable: config.searchable,
            show_count: config.show_count,
            placeholder: config.placeholder,
            disabled: config.disabled,
        }
    }
}

/// Create a multi select builder
pub fn multi_select(registry: &DismissRegistry) -> MultiSelectBuilder {
    MultiSelectBuilder::new(registry)
}

/// Multi-value dropdown
#[derive(Debug)]
pub struct MultiSelect {
    selection: MultiSelection,
    listbox: Listbox,
    disclosure: OverlayDisclosure,
    searchable: bool,
    show_count: bool,
    placeholder: Option<String>,
    disabled: bool,
}

impl MultiSelect {
    /// Selected values in selection order
    pub fn values(&self) -> IndexSet<String> {
        self.selection.read()
    }

    pub fn is_full(&self) -> bool {
        self.selection.is_full()
    }

    pub fn search(&self) -> &str {
        self.listbox.search()
    }

    pub fn focus_index(&self) -> isize {
        self.listbox.nav().focus_index()
    }

    /// Trigger clicked; only ever opens
    pub fn click_trigger(&mut self) -> bool {
        if self.disabled || !self.disclosure.open() {
            return false;
        }
        self.listbox.reset_focus();
        true
    }

    /// Search text changed; ignored when not searchable
    pub fn set_search(&mut self, text: &str) -> Result<bool> {
        if self.disabled || !self.searchable {
            return Ok(false);
        }
        Ok(self.listbox.set_search(text)?)
    }

    pub fn hover_option(&mut self, row: usize) -> bool {
        self.disclosure.is_open() && self.listbox.hover(row)
    }

    /// Toggle the option at `row`; the panel stays open
    pub fn click_option(&mut self, row: usize) -> bool {
        !self.disabled && self.disclosure.is_open() && self.toggle_row(row)
    }

    /// Chip close button
    pub fn remove_chip(&mut self, value: &str) -> bool {
        !self.disabled && self.selection.remove(&value.to_string())
    }

    /// Remove every selected value
    pub fn clear(&mut self) -> bool {
        !self.disabled && self.selection.clear()
    }

    fn toggle_row(&mut self, row: usize) -> bool {
        let Some(option) = self.listbox.option_at(row).cloned() else {
            return false;
        };
        match self.selection.commit_option(&option) {
            CommitOutcome::Selected | CommitOutcome::Deselected => true,
            CommitOutcome::Rejected(reason) => {
                tracing::trace!(value = %option.value, ?reason, "multi select toggle refused");
                false
            }
        }
    }

    fn dismiss(&mut self, reason: CloseReason) -> bool {
        let closed = self.disclosure.close(reason);
        self.listbox.clear_search();
        closed
    }

    fn chips(&self, values: &IndexSet<String>) -> Vec<ChipView> {
        self.listbox
            .options()
            .iter()
            .filter(|opt| values.contains(&opt.value))
            .map(|opt| ChipView {
                value: opt.value.clone(),
                label: opt.label.clone(),
            })
            .collect()
    }

    fn badge(&self, count: usize) -> Option<String> {
        if !self.show_count || count == 0 {
            return None;
        }
        Some(match self.selection.capacity() {
            Some(max) => format!("{} / {}", count, max),
            None => count.to_string(),
        })
    }
}

impl Widget for MultiSelect {
    type View = MultiSelectView;

    fn kind(&self) -> WidgetKind {
        WidgetKind::MultiSelect
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool> {
        if self.disabled {
            return Ok(false);
        }
        self.disclosure.sync();

        if !self.disclosure.is_open() {
            let opens = matches!(event.key, Key::Enter | Key::ArrowDown | Key::ArrowUp);
            return Ok(opens && self.click_trigger());
        }

        let handled = match self.listbox.nav_mut().handle_key(event) {
            NavigationOutcome::Moved => true,
            NavigationOutcome::Commit(Some(row)) => self.toggle_row(row),
            NavigationOutcome::Commit(None) => false,
            NavigationOutcome::Dismiss => self.dismiss(CloseReason::Escape),
            NavigationOutcome::Ignored => false,
        };
        Ok(handled)
    }

    fn handle_pointer_down(&mut self, target: NodeId, containment: &dyn Containment) -> bool {
        if !self.disclosure.handle_pointer_down(target, containment) {
            return false;
        }
        self.listbox.clear_search();
        true
    }

    fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    fn view(&self) -> MultiSelectView {
        let values = self.values();
        let full = self.is_full();
        let chips = self.chips(&values);

        MultiSelectView {
            open: self.is_open(),
            disabled: self.disabled,
            badge: self.badge(chips.len()),
            rows: self.listbox.rows(
                |opt| values.contains(&opt.value),
                |opt| full && !values.contains(&opt.value),
            ),
            values: values.into_iter().collect(),
            chips,
            placeholder: self.placeholder.clone(),
            searchable: self.searchable,
            search: self.listbox.search().to_string(),
            focus_index: self.focus_index(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recorder, Host};
    use pretty_assertions::assert_eq;

    fn languages(host: &Host) -> MultiSelectBuilder {
        multi_select(&host.registry)
            .option("rust", "Rust")
            .option("go", "Go")
            .option("zig", "Zig")
            .option_disabled("cobol", "COBOL")
            .anchor(host.trigger)
            .panel(host.panel)
    }

    fn set(values: &[&str]) -> IndexSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_cap_refuses_without_callback() {
        let host = Host::new();
        let (log, cb) = recorder::<IndexSet<String>>();
        let mut ms = languages(&host).max(2).on_change(cb).build();
        ms.click_trigger();

        assert!(ms.click_option(0));
        assert!(ms.click_option(1));
        assert!(!ms.click_option(2));

        assert_eq!(ms.values(), set(&["rust", "go"]));
        assert_eq!(log.lock().unwrap().len(), 2);
        assert!(ms.is_open());

        let rows = ms.view().rows;
        assert_eq!(
            rows.iter().map(|r| r.disabled).collect::<Vec<_>>(),
            vec![false, false, true, true]
        );
    }

    #[test]
    fn test_deselect_frees_capacity() {
        let host = Host::new();
        let mut ms = languages(&host).max(1).default_values(["go"]).build();
        ms.click_trigger();

        assert!(!ms.click_option(0));
        assert!(ms.click_option(1));
        assert!(ms.values().is_empty());
        assert!(ms.click_option(0));
        assert_eq!(ms.values(), set(&["rust"]));
    }

    #[test]
    fn test_chips_follow_option_order() {
        let host = Host::new();
        let mut ms = languages(&host).show_count(true).build();
        ms.click_trigger();
        ms.click_option(2);
        ms.click_option(0);

        let view = ms.view();
        assert_eq!(view.values, vec!["zig".to_string(), "rust".to_string()]);
        assert_eq!(
            view.chips,
            vec![
                ChipView {
                    value: "rust".into(),
                    label: "Rust".into()
                },
                ChipView {
                    value: "zig".into(),
                    label: "Zig".into()
                },
            ]
        );
        assert_eq!(view.badge.as_deref(), Some("2"));
    }

    #[test]
    fn test_remove_chip() {
        let host = Host::new();
        let (log, cb) = recorder::<IndexSet<String>>();
        let mut ms = languages(&host)
            .default_values(["rust", "go"])
            .on_change(cb)
            .build();

        assert!(ms.remove_chip("rust"));
        assert!(!ms.remove_chip("rust"));
        assert_eq!(ms.values(), set(&["go"]));
        assert_eq!(*log.lock().unwrap(), vec![set(&["go"])]);
        assert!(!ms.is_open());
    }

    #[test]
    fn test_search_and_keyboard_toggle() {
        let host = Host::new();
        let mut ms = languages(&host).build();

        ms.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
        assert!(ms.is_open());
        ms.set_search("g").unwrap();
        assert_eq!(ms.view().rows.len(), 1);

        ms.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
        assert!(ms.handle_key(&KeyEvent::named("Enter")).unwrap());
        assert_eq!(ms.values(), set(&["go"]));
        assert!(ms.is_open());
    }

    #[test]
    fn test_not_searchable_ignores_text() {
        let host = Host::new();
        let mut ms = languages(&host).searchable(false).build();
        ms.click_trigger();

        assert!(!ms.set_search("zig").unwrap());
        assert_eq!(ms.view().rows.len(), 4);
    }

    #[test]
    fn test_outside_click_clears_search() {
        let host = Host::new();
        let mut ms = languages(&host).build();
        ms.click_trigger();
        ms.set_search("ru").unwrap();

        assert!(ms.handle_pointer_down(host.outside, &host.tree));
        assert!(!ms.is_open());
        assert_eq!(ms.search(), "");
        assert_eq!(host.registry_listeners(), 0);
    }

    #[test]
    fn test_closed_panel_ignores_rows() {
        let host = Host::new();
        let (log, cb) = recorder::<IndexSet<String>>();
        let mut ms = languages(&host).on_change(cb).build();

        assert!(!ms.hover_option(0));
        assert!(!ms.click_option(0));
        assert_eq!(ms.focus_index(), -1);

        ms.click_trigger();
        assert!(ms.handle_pointer_down(host.outside, &host.tree));
        assert!(!ms.click_option(1));
        assert!(ms.values().is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_controlled_values() {
        let host = Host::new();
        let (log, cb) = recorder::<IndexSet<String>>();
        let mut ms = languages(&host)
            .values(|| set(&["zig"]))
            .max(1)
            .on_change(cb)
            .build();
        ms.click_trigger();

        assert!(!ms.click_option(0));
        assert!(ms.click_option(2));
        assert_eq!(*log.lock().unwrap(), vec![IndexSet::new()]);
        assert_eq!(ms.values(), set(&["zig"]));
    }
}
