//! Combobox component - searchable single selection
//!
//! A text input that filters an option list, with keyboard navigation and
//! optional free-text values.
//!
//! # Example
//!
//! ```rust
//! use latch_cn::prelude::*;
//!
//! let registry = dismiss_registry();
//! let mut country = cn::combobox(&registry)
//!     .placeholder("Search countries...")
//!     .option("us", "United States")
//!     .option("uk", "United Kingdom")
//!     .option("de", "Germany")
//!     .on_change(|value| println!("Selected: {}", value))
//!     .build();
//!
//! country.set_search("united").unwrap();
//! country.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
//! country.handle_key(&KeyEvent::named("Enter")).unwrap();
//!
//! assert_eq!(country.value().as_deref(), Some("us"));
//! assert_eq!(country.display_text(), "United States");
//! assert!(!country.is_open());
//! ```

use std::sync::Arc;

use serde::Serialize;

use latch_core::{
    custom_candidate, Containment, Key, KeyEvent, NavigationOutcome, NodeId, OptionFilter,
    ReadFn, SelectOption, SingleSelection,
};
use latch_overlay::{CloseReason, DismissRegistry, OverlayDisclosure};

use super::listbox::{Listbox, OptionRowView};
use crate::error::Result;
use crate::widget::{Widget, WidgetKind};

/// View model for a [`Combobox`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComboboxView {
    pub open: bool,
    pub disabled: bool,
    pub value: Option<String>,
    /// Selected option label, or the raw value for custom entries
    pub display_text: String,
    pub placeholder: Option<String>,
    pub search: String,
    /// Focused row, `-1` for none
    pub focus_index: isize,
    pub rows: Vec<OptionRowView>,
    /// Text Enter would add when no option matches
    pub custom_hint: Option<String>,
}

/// Internal configuration for building a Combobox
struct ComboboxConfig {
    registry: DismissRegistry,
    options: Vec<SelectOption>,
    default_value: Option<String>,
    value: Option<ReadFn<Option<String>>>,
    placeholder: Option<String>,
    disabled: bool,
    allow_custom: bool,
    filter: OptionFilter,
    anchor: Option<NodeId>,
    panel: Option<NodeId>,
    on_change: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

/// Builder for creating Combobox components with fluent API
pub struct ComboboxBuilder {
    config: ComboboxConfig,
}

impl ComboboxBuilder {
    pub fn new(registry: &DismissRegistry) -> Self {
        Self {
            config: ComboboxConfig {
                registry: Arc::clone(registry),
                options: Vec::new(),
                default_value: None,
                value: None,
                placeholder: None,
                disabled: false,
                allow_custom: false,
                filter: OptionFilter::Label,
                anchor: None,
                panel: None,
                on_change: None,
            },
        }
    }

    /// Add an option with value and label
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.config.options.push(SelectOption::new(value, label));
        self
    }

    /// Add a disabled option
    pub fn option_disabled(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.config
            .options
            .push(SelectOption::new(value, label).disabled());
        self
    }

    /// Add multiple options
    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.config.options.extend(options);
        self
    }

    /// Initial value (uncontrolled)
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.config.default_value = Some(value.into());
        self
    }

    /// Read the value from the host (controlled)
    pub fn value<F>(mut self, read: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.config.value = Some(Arc::new(read));
        self
    }

    /// Set the placeholder text
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.placeholder = Some(placeholder.into());
        self
    }

    /// Set disabled state
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    /// Allow custom values not in the options list
    pub fn allow_custom(mut self, allow: bool) -> Self {
        self.config.allow_custom = allow;
        self
    }

    /// Replace the default label filter
    pub fn filter(mut self, filter: OptionFilter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Input node (inside the dismiss region)
    pub fn anchor(mut self, node: NodeId) -> Self {
        self.config.anchor = Some(node);
        self
    }

    /// Dropdown node (inside the dismiss region)
    pub fn panel(mut self, node: NodeId) -> Self {
        self.config.panel = Some(node);
        self
    }

    /// Set the change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.on_change = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Combobox {
        let config = self.config;

        let mut selection = match config.value {
            Some(read) => SingleSelection::controlled(move || read()),
            None => SingleSelection::uncontrolled(config.default_value),
        };
        if let Some(cb) = config.on_change {
            selection = selection.on_change(move |v: &String| cb(v));
        }

        let mut disclosure = OverlayDisclosure::new(config.registry).label("combobox");
        if let Some(node) = config.anchor {
            disclosure = disclosure.anchor(node);
        }
        if let Some(node) = config.panel {
            disclosure = disclosure.panel(node);
        }

        Combobox {
            selection,
            listbox: Listbox::new(config.options, config.filter),
            disclosure,
            placeholder: config.placeholder,
            disabled: config.disabled,
            allow_custom: config.allow_custom,
        }
    }
}

/// Create a combobox builder
pub fn combobox(registry: &DismissRegistry) -> ComboboxBuilder {
    ComboboxBuilder::new(registry)
}

/// Searchable single-value select
#[derive(Debug)]
pub struct Combobox {
    selection: SingleSelection,
    listbox: Listbox,
    disclosure: OverlayDisclosure,
    placeholder: Option<String>,
    disabled: bool,
    allow_custom: bool,
}

impl Combobox {
    pub fn value(&self) -> Option<String> {
        self.selection.read()
    }

    /// Selected option label, or the raw value when it names no option
    pub fn display_text(&self) -> String {
        let Some(value) = self.value() else {
            return String::new();
        };
        match self.listbox.label_of(&value) {
            Some(label) => label.to_string(),
            None => value,
        }
    }

    pub fn search(&self) -> &str {
        self.listbox.search()
    }

    pub fn focus_index(&self) -> isize {
        self.listbox.nav().focus_index()
    }

    pub fn disclosure(&self) -> &OverlayDisclosure {
        &self.disclosure
    }

    /// Input received focus
    pub fn focus_input(&mut self) -> bool {
        !self.disabled && self.open_panel()
    }

    /// Trigger (chevron) clicked
    pub fn click_trigger(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        if self.disclosure.is_open() {
            self.dismiss(CloseReason::Explicit)
        } else {
            self.open_panel()
        }
    }

    /// Input text changed
    ///
    /// Opens the panel. A failing custom filter leaves everything as it was.
    pub fn set_search(&mut self, text: &str) -> Result<bool> {
        if self.disabled {
            return Ok(false);
        }
        let changed = self.listbox.set_search(text)?;
        let opened = self.disclosure.open();
        Ok(changed || opened)
    }

    /// Pointer entered a row
    pub fn hover_option(&mut self, row: usize) -> bool {
        self.disclosure.is_open() && self.listbox.hover(row)
    }

    /// Row clicked
    pub fn click_option(&mut self, row: usize) -> bool {
        !self.disabled && self.disclosure.is_open() && self.commit_row(row)
    }

    fn open_panel(&mut self) -> bool {
        let opened = self.disclosure.open();
        if opened {
            self.listbox.reset_focus();
        }
        opened
    }

    fn dismiss(&mut self, reason: CloseReason) -> bool {
        let closed = self.disclosure.close(reason);
        self.listbox.clear_search();
        closed
    }

    fn commit_row(&mut self, row: usize) -> bool {
        let Some(option) = self.listbox.option_at(row).cloned() else {
            return false;
        };
        if !self.selection.commit_option(&option).is_committed() {
            return false;
        }
        self.dismiss(CloseReason::Commit);
        true
    }

    fn commit_custom(&mut self) -> bool {
        let Some(text) = custom_candidate(self.listbox.search(), self.allow_custom).map(str::to_owned)
        else {
            return false;
        };
        tracing::debug!(value = %text, "combobox committed custom value");
        self.selection.commit(text);
        self.dismiss(CloseReason::Commit);
        true
    }
}

impl Widget for Combobox {
    type View = ComboboxView;

    fn kind(&self) -> WidgetKind {
        WidgetKind::Combobox
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool> {
        if self.disabled {
            return Ok(false);
        }
        self.disclosure.sync();

        if matches!(event.key, Key::ArrowDown | Key::ArrowUp) {
            self.open_panel();
        }

        let handled = match self.listbox.nav_mut().handle_key(event) {
            NavigationOutcome::Moved => true,
            NavigationOutcome::Commit(Some(row)) => self.commit_row(row),
            NavigationOutcome::Commit(None) => self.commit_custom(),
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

    fn view(&self) -> ComboboxView {
        let value = self.value();
        let rows = self.listbox.rows(
            |opt| value.as_deref() == Some(opt.value.as_str()),
            |_| false,
        );
        let custom_hint = if rows.is_empty() {
            custom_candidate(self.listbox.search(), self.allow_custom).map(str::to_owned)
        } else {
            None
        };

        ComboboxView {
            open: self.is_open(),
            disabled: self.disabled,
            display_text: self.display_text(),
            value,
            placeholder: self.placeholder.clone(),
            search: self.listbox.search().to_string(),
            focus_index: self.focus_index(),
            rows,
            custom_hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recorder, Host};
    use latch_core::{FilterError, Modifiers};
    use pretty_assertions::assert_eq;

    fn key(name: &str) -> KeyEvent {
        KeyEvent::named(name)
    }

    fn fruits(host: &Host) -> ComboboxBuilder {
        combobox(&host.registry)
            .option("apple", "Apple")
            .option_disabled("banana", "Banana")
            .option("cherry", "Cherry")
            .anchor(host.trigger)
            .panel(host.panel)
    }

    #[test]
    fn test_enter_on_disabled_row_does_nothing() {
        let host = Host::new();
        let (log, cb) = recorder();
        let mut cb_box = fruits(&host).on_change(move |v| cb(&v.to_string())).build();

        cb_box.handle_key(&key("ArrowDown")).unwrap();
        cb_box.handle_key(&key("ArrowDown")).unwrap();
        assert_eq!(cb_box.focus_index(), 1);

        assert!(!cb_box.handle_key(&key("Enter")).unwrap());
        assert!(cb_box.is_open());
        assert_eq!(cb_box.value(), None);
        assert!(log.lock().unwrap().is_empty());

        cb_box.handle_key(&key("ArrowDown")).unwrap();
        assert!(cb_box.handle_key(&key("Enter")).unwrap());
        assert_eq!(cb_box.value().as_deref(), Some("cherry"));
        assert!(!cb_box.is_open());
        assert_eq!(*log.lock().unwrap(), vec!["cherry".to_string()]);
    }

    #[test]
    fn test_typing_filters_and_resets_focus() {
        let host = Host::new();
        let mut cb_box = fruits(&host).build();

        cb_box.handle_key(&key("ArrowDown")).unwrap();
        assert_eq!(cb_box.focus_index(), 0);

        assert!(cb_box.set_search("err").unwrap());
        assert!(cb_box.is_open());
        assert_eq!(cb_box.focus_index(), -1);

        let view = cb_box.view();
        assert_eq!(
            view.rows,
            vec![OptionRowView {
                value: "cherry".into(),
                label: "Cherry".into(),
                disabled: false,
                selected: false,
                focused: false,
            }]
        );
    }

    #[test]
    fn test_custom_value_on_enter() {
        let host = Host::new();
        let mut cb_box = fruits(&host).allow_custom(true).build();

        cb_box.set_search("Kiwi").unwrap();
        assert_eq!(cb_box.view().custom_hint.as_deref(), Some("Kiwi"));

        assert!(cb_box.handle_key(&key("Enter")).unwrap());
        assert_eq!(cb_box.value().as_deref(), Some("Kiwi"));
        assert_eq!(cb_box.display_text(), "Kiwi");
        assert_eq!(cb_box.search(), "");
    }

    #[test]
    fn test_custom_value_needs_opt_in() {
        let host = Host::new();
        let mut cb_box = fruits(&host).build();

        cb_box.set_search("Kiwi").unwrap();
        assert!(!cb_box.handle_key(&key("Enter")).unwrap());
        assert_eq!(cb_box.value(), None);
        assert!(cb_box.is_open());
        assert_eq!(cb_box.view().custom_hint, None);
    }

    #[test]
    fn test_escape_clears_search_keeps_value() {
        let host = Host::new();
        let mut cb_box = fruits(&host).default_value("apple").build();

        cb_box.set_search("ch").unwrap();
        assert!(cb_box.handle_key(&key("Escape")).unwrap());

        assert!(!cb_box.is_open());
        assert_eq!(cb_box.search(), "");
        assert_eq!(cb_box.value().as_deref(), Some("apple"));
        assert_eq!(host.registry_listeners(), 0);
    }

    #[test]
    fn test_outside_click_closes_inside_does_not() {
        let host = Host::new();
        let mut cb_box = fruits(&host).build();
        cb_box.set_search("a").unwrap();

        assert!(!cb_box.handle_pointer_down(host.row, &host.tree));
        assert!(cb_box.is_open());
        assert_eq!(cb_box.search(), "a");

        assert!(cb_box.handle_pointer_down(host.outside, &host.tree));
        assert!(!cb_box.is_open());
        assert_eq!(cb_box.search(), "");
    }

    #[test]
    fn test_hover_then_click() {
        let host = Host::new();
        let mut cb_box = fruits(&host).build();
        cb_box.focus_input();

        assert!(cb_box.hover_option(2));
        assert_eq!(cb_box.focus_index(), 2);
        assert!(cb_box.click_option(2));
        assert_eq!(cb_box.display_text(), "Cherry");
        assert!(!cb_box.click_option(1));
    }

    #[test]
    fn test_filter_error_aborts_keystroke() {
        let host = Host::new();
        let mut cb_box = fruits(&host)
            .filter(OptionFilter::custom(|opt, q| {
                if q.len() > 3 {
                    Err(FilterError::predicate(q, "query too long"))
                } else {
                    Ok(opt.value.contains(q))
                }
            }))
            .build();

        cb_box.set_search("ch").unwrap();
        cb_box.handle_key(&key("ArrowDown")).unwrap();

        let err = cb_box.set_search("cher").unwrap_err();
        assert_eq!(
            err,
            crate::LatchError::Filter(FilterError::predicate("cher", "query too long"))
        );
        assert_eq!(cb_box.search(), "ch");
        assert_eq!(cb_box.focus_index(), 0);
        assert_eq!(cb_box.view().rows.len(), 1);
    }

    #[test]
    fn test_closed_panel_ignores_rows() {
        let host = Host::new();
        let (log, cb) = recorder();
        let mut cb_box = fruits(&host).on_change(move |v| cb(&v.to_string())).build();

        assert!(!cb_box.hover_option(0));
        assert!(!cb_box.click_option(0));
        assert_eq!(cb_box.focus_index(), -1);
        assert_eq!(cb_box.value(), None);

        cb_box.focus_input();
        cb_box.click_trigger();
        assert!(!cb_box.is_open());
        assert!(!cb_box.click_option(2));
        assert_eq!(cb_box.value(), None);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_controlled_value() {
        let host = Host::new();
        let (log, cb) = recorder();
        let mut cb_box = fruits(&host)
            .value(|| Some("apple".to_string()))
            .on_change(move |v| cb(&v.to_string()))
            .build();

        cb_box.focus_input();
        cb_box.click_option(2);

        assert_eq!(cb_box.value().as_deref(), Some("apple"));
        assert_eq!(*log.lock().unwrap(), vec!["cherry".to_string()]);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let host = Host::new();
        let mut cb_box = fruits(&host).disabled(true).build();

        assert!(!cb_box.focus_input());
        assert!(!cb_box
            .handle_key(&key("ArrowDown").with_modifiers(Modifiers::NONE))
            .unwrap());
        assert!(!cb_box.set_search("a").unwrap());
        assert!(!cb_box.is_open());
    }

    #[test]
    fn test_arrow_up_from_closed_focuses_last() {
        let host = Host::new();
        let mut cb_box = fruits(&host).build();

        cb_box.handle_key(&key("ArrowUp")).unwrap();
        assert!(cb_box.is_open());
        assert_eq!(cb_box.focus_index(), 2);
    }
}
