//! Select component - single selection from a fixed list
//!
//! No search input. Opening the panel leaves keyboard focus unset; the current
//! value is shown through the row's `selected` flag.
//!
//! # Example
//!
//! ```rust
//! use latch_cn::prelude::*;
//!
//! let registry = dismiss_registry();
//! let mut size = cn::select(&registry)
//!     .placeholder("Choose a size...")
//!     .option("sm", "Small")
//!     .option("md", "Medium")
//!     .option("lg", "Large")
//!     .default_value("md")
//!     .build();
//!
//! size.click_trigger();
//! // Nothing focused yet: ArrowUp wraps to the last row
//! size.handle_key(&KeyEvent::named("ArrowUp")).unwrap();
//! size.handle_key(&KeyEvent::named("Enter")).unwrap();
//!
//! assert_eq!(size.value().as_deref(), Some("lg"));
//! assert!(!size.is_open());
//! ```

use std::sync::Arc;

use serde::Serialize;

use latch_core::{
    Containment, Key, KeyEvent, NavigationOutcome, NodeId, OptionFilter, ReadFn, SelectOption,
    SingleSelection,
};
use latch_overlay::{CloseReason, DismissRegistry, OverlayDisclosure};

use super::listbox::{Listbox, OptionRowView};
use crate::error::Result;
use crate::widget::{Widget, WidgetKind};

/// View model for a [`Select`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectView {
    pub open: bool,
    pub disabled: bool,
    pub value: Option<String>,
    /// Label of the selected option, or the placeholder
    pub trigger_text: Option<String>,
    pub focus_index: isize,
    pub rows: Vec<OptionRowView>,
}

struct SelectConfig {
    registry: DismissRegistry,
    options: Vec<SelectOption>,
    default_value: Option<String>,
    value: Option<ReadFn<Option<String>>>,
    placeholder: Option<String>,
    disabled: bool,
    anchor: Option<NodeId>,
    panel: Option<NodeId>,
    on_change: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

/// Builder for [`Select`]
pub struct SelectBuilder {
    config: SelectConfig,
}

impl SelectBuilder {
    pub fn new(registry: &DismissRegistry) -> Self {
        Self {
            config: SelectConfig {
                registry: Arc::clone(registry),
                options: Vec::new(),
                default_value: None,
                value: None,
                placeholder: None,
                disabled: false,
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

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.placeholder = Some(placeholder.into());
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

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.on_change = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Select {
        let config = self.config;

        let mut selection = match config.value {
            Some(read) => SingleSelection::controlled(move || read()),
            None => SingleSelection::uncontrolled(config.default_value),
        };
        if let Some(cb) = config.on_change {
            selection = selection.on_change(move |v: &String| cb(v));
        }

        let mut disclosure = OverlayDisclosure::new(config.registry).label("select");
        if let Some(node) = config.anchor {
            disclosure = disclosure.anchor(node);
        }
        if let Some(node) = config.panel {
            disclosure = disclosure.panel(node);
        }

        Select {
            selection,
            listbox: Listbox::new(config.options, OptionFilter::Label),
            disclosure,
            placeholder: config.placeholder,
            disabled: config.disabled,
        }
    }
}

/// Create a select builder
pub fn select(registry: &DismissRegistry) -> SelectBuilder {
    SelectBuilder::new(registry)
}

/// Single-value dropdown
#[derive(Debug)]
pub struct Select {
    selection: SingleSelection,
    listbox: Listbox,
    disclosure: OverlayDisclosure,
    placeholder: Option<String>,
    disabled: bool,
}

impl Select {
    pub fn value(&self) -> Option<String> {
        self.selection.read()
    }

    /// Label of the selected option
    pub fn selected_label(&self) -> Option<String> {
        let value = self.value()?;
        self.listbox.label_of(&value).map(str::to_string)
    }

    pub fn focus_index(&self) -> isize {
        self.listbox.nav().focus_index()
    }

    pub fn click_trigger(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        if self.disclosure.is_open() {
            self.disclosure.close(CloseReason::Explicit)
        } else {
            self.open_panel()
        }
    }

    pub fn hover_option(&mut self, row: usize) -> bool {
        self.disclosure.is_open() && self.listbox.hover(row)
    }

    pub fn click_option(&mut self, row: usize) -> bool {
        !self.disabled && self.disclosure.is_open() && self.commit_row(row)
    }

    fn open_panel(&mut self) -> bool {
        if !self.disclosure.open() {
            return false;
        }
        self.listbox.reset_focus();
        true
    }

    fn commit_row(&mut self, row: usize) -> bool {
        let Some(option) = self.listbox.option_at(row).cloned() else {
            return false;
        };
        if !self.selection.commit_option(&option).is_committed() {
            return false;
        }
        self.disclosure.close(CloseReason::Commit);
        true
    }
}

impl Widget for Select {
    type View = SelectView;

    fn kind(&self) -> WidgetKind {
        WidgetKind::Select
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool> {
        if self.disabled {
            return Ok(false);
        }
        self.disclosure.sync();

        if !self.disclosure.is_open() {
            let opens = matches!(
                event.key,
                Key::Enter | Key::Space | Key::ArrowDown | Key::ArrowUp
            );
            return Ok(opens && self.open_panel());
        }

        let handled = match self.listbox.nav_mut().handle_key(event) {
            NavigationOutcome::Moved => true,
            NavigationOutcome::Commit(Some(row)) => self.commit_row(row),
            NavigationOutcome::Commit(None) => false,
            NavigationOutcome::Dismiss => self.disclosure.close(CloseReason::Escape),
            NavigationOutcome::Ignored => false,
        };
        Ok(handled)
    }

    fn handle_pointer_down(&mut self, target: NodeId, containment: &dyn Containment) -> bool {
        self.disclosure.handle_pointer_down(target, containment)
    }

    fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    fn view(&self) -> SelectView {
        let value = self.value();
        SelectView {
            open: self.is_open(),
            disabled: self.disabled,
            trigger_text: self.selected_label().or_else(|| self.placeholder.clone()),
            rows: self.listbox.rows(
                |opt| value.as_deref() == Some(opt.value.as_str()),
                |_| false,
            ),
            value,
            focus_index: self.focus_index(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recorder, Host};
    use pretty_assertions::assert_eq;

    fn key(name: &str) -> KeyEvent {
        KeyEvent::named(name)
    }

    fn sizes(host: &Host) -> SelectBuilder {
        select(&host.registry)
            .placeholder("Size")
            .option("sm", "Small")
            .option_disabled("md", "Medium")
            .option("lg", "Large")
            .anchor(host.trigger)
            .panel(host.panel)
    }

    #[test]
    fn test_trigger_toggles() {
        let host = Host::new();
        let mut sel = sizes(&host).build();

        assert!(sel.click_trigger());
        assert!(sel.is_open());
        assert_eq!(host.registry_listeners(), 1);

        assert!(sel.click_trigger());
        assert!(!sel.is_open());
        assert_eq!(host.registry_listeners(), 0);
    }

    #[test]
    fn test_keyboard_opens_then_navigates() {
        let host = Host::new();
        let (log, cb) = recorder();
        let mut sel = sizes(&host).on_change(move |v| cb(&v.to_string())).build();

        assert!(sel.handle_key(&key("Enter")).unwrap());
        assert!(sel.is_open());
        assert_eq!(sel.focus_index(), -1);

        sel.handle_key(&key("ArrowUp")).unwrap();
        assert_eq!(sel.focus_index(), 2);
        sel.handle_key(&key("ArrowDown")).unwrap();
        assert_eq!(sel.focus_index(), 0);

        assert!(sel.handle_key(&key("Enter")).unwrap());
        assert_eq!(sel.value().as_deref(), Some("sm"));
        assert!(!sel.is_open());
        assert_eq!(*log.lock().unwrap(), vec!["sm".to_string()]);
    }

    #[test]
    fn test_open_resets_focus() {
        let host = Host::new();
        let mut sel = sizes(&host).default_value("lg").build();

        sel.click_trigger();
        assert_eq!(sel.focus_index(), -1);
        assert!(sel.view().rows[2].selected);
        sel.handle_key(&key("ArrowDown")).unwrap();
        assert_eq!(sel.focus_index(), 0);

        sel.click_trigger();
        sel.click_trigger();
        assert_eq!(sel.focus_index(), -1);
    }

    #[test]
    fn test_closed_panel_ignores_rows() {
        let host = Host::new();
        let (log, cb) = recorder();
        let mut sel = sizes(&host).on_change(move |v| cb(&v.to_string())).build();

        assert!(!sel.hover_option(0));
        assert!(!sel.click_option(0));
        assert_eq!(sel.focus_index(), -1);
        assert_eq!(sel.value(), None);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_option_not_committed() {
        let host = Host::new();
        let mut sel = sizes(&host).build();
        sel.click_trigger();

        assert!(!sel.click_option(1));
        assert!(sel.is_open());
        assert_eq!(sel.value(), None);
    }

    #[test]
    fn test_view() {
        let host = Host::new();
        let mut sel = sizes(&host).build();
        assert_eq!(sel.view().trigger_text.as_deref(), Some("Size"));

        sel.click_trigger();
        sel.click_option(2);

        let view = sel.view();
        assert_eq!(view.trigger_text.as_deref(), Some("Large"));
        assert_eq!(
            view.rows.iter().map(|r| r.selected).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert_eq!(
            view.rows.iter().map(|r| r.disabled).collect::<Vec<_>>(),
            vec![false, true, false]
        );
    }

    #[test]
    fn test_escape_and_outside_click() {
        let host = Host::new();
        let mut sel = sizes(&host).build();

        sel.click_trigger();
        assert!(sel.handle_key(&key("Escape")).unwrap());
        assert!(!sel.is_open());

        sel.click_trigger();
        assert!(!sel.handle_pointer_down(host.trigger, &host.tree));
        assert!(sel.handle_pointer_down(host.outside, &host.tree));
        assert!(!sel.is_open());
    }
}
