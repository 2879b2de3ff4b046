//! Menu component - trigger-anchored action menu
//!
//! Items are a [`MenuItem`] tree. Parent items open their submenu on hover.
//! Activating an enabled leaf reports its id through `on_value_change` and
//! `on_select`, then closes every level.
//!
//! Keyboard, on the trigger: Enter/Space toggle, ArrowDown opens. In the
//! panel: ArrowDown/ArrowUp wrap, Home/End jump, Enter/Space activate,
//! Escape closes the deepest open level.
//!
//! # Example
//!
//! ```rust
//! use latch_cn::prelude::*;
//!
//! let registry = dismiss_registry();
//! let mut sort = cn::menu(&registry)
//!     .item("name", "Name")
//!     .item("date", "Date modified")
//!     .separator()
//!     .item_disabled("size", "Size")
//!     .on_value_change(|value| println!("Sort by {}", value))
//!     .build();
//!
//! sort.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
//! sort.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
//! sort.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
//! sort.handle_key(&KeyEvent::named("Enter")).unwrap();
//!
//! assert_eq!(sort.value().as_deref(), Some("date"));
//! assert!(!sort.is_open());
//! ```

use std::sync::Arc;

use serde::Serialize;

use latch_core::{Containment, Key, KeyEvent, KeyboardNavigator, NodeId, SingleSelection};
use latch_overlay::{
    CloseReason, DismissRegistry, MenuActivation, MenuItem, MenuItemKind, OverlayDisclosure,
    SubmenuCoordinator,
};

use crate::error::Result;
use crate::widget::{Widget, WidgetKind};

/// One rendered menu entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuItemView {
    pub id: String,
    pub label: String,
    pub shortcut: Option<String>,
    pub disabled: bool,
    pub separator: bool,
    pub has_submenu: bool,
    /// Matches the menu's current value
    pub selected: bool,
    /// Keyboard focus (top level only)
    pub focused: bool,
    /// Parent item whose submenu is open
    pub expanded: bool,
}

/// Item views for every visible level, top level first
pub(crate) fn level_views(
    coordinator: &SubmenuCoordinator,
    focused: Option<usize>,
    selected: Option<&str>,
) -> Vec<Vec<MenuItemView>> {
    (0..=coordinator.depth())
        .filter_map(|level| coordinator.items_at(level).map(|items| (level, items)))
        .map(|(level, items)| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| MenuItemView {
                    id: item.id.clone(),
                    label: item.label.clone(),
                    shortcut: item.shortcut.clone(),
                    disabled: item.is_disabled(),
                    separator: item.separator,
                    has_submenu: matches!(item.kind(), MenuItemKind::Submenu(_)),
                    selected: !item.separator && selected == Some(item.id.as_str()),
                    focused: level == 0 && focused == Some(index),
                    expanded: coordinator.active(level) == Some(index),
                })
                .collect()
        })
        .collect()
}

/// View model for a [`Menu`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuView {
    pub open: bool,
    pub disabled: bool,
    pub value: Option<String>,
    pub focus_index: isize,
    pub levels: Vec<Vec<MenuItemView>>,
}

struct MenuConfig {
    registry: DismissRegistry,
    items: Vec<MenuItem>,
    default_value: Option<String>,
    value: Option<Arc<dyn Fn() -> Option<String> + Send + Sync>>,
    open: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
    disabled: bool,
    anchor: Option<NodeId>,
    panel: Option<NodeId>,
    on_value_change: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    on_open_change: Option<Arc<dyn Fn(bool) + Send + Sync>>,
    on_select: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

/// Builder for [`Menu`]
pub struct MenuBuilder {
    config: MenuConfig,
}

impl MenuBuilder {
    pub fn new(registry: &DismissRegistry) -> Self {
        Self {
            config: MenuConfig {
                registry: Arc::clone(registry),
                items: Vec::new(),
                default_value: None,
                value: None,
                open: None,
                disabled: false,
                anchor: None,
                panel: None,
                on_value_change: None,
                on_open_change: None,
                on_select: None,
            },
        }
    }

    /// Add an action item
    pub fn item(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.config.items.push(MenuItem::action(id, label));
        self
    }

    /// Add a disabled action item
    pub fn item_disabled(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.config.items.push(MenuItem::action(id, label).disabled());
        self
    }

    /// Add a parent item with a nested submenu
    pub fn submenu(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        children: impl IntoIterator<Item = MenuItem>,
    ) -> Self {
        self.config.items.push(MenuItem::submenu(id, label, children));
        self
    }

    pub fn separator(mut self) -> Self {
        self.config.items.push(MenuItem::separator());
        self
    }

    /// Add prebuilt items
    pub fn items(mut self, items: impl IntoIterator<Item = MenuItem>) -> Self {
        self.config.items.extend(items);
        self
    }

    /// Initially selected item id (uncontrolled)
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.config.default_value = Some(value.into());
        self
    }

    /// Read the selected item id from the host (controlled)
    pub fn value<F>(mut self, read: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.config.value = Some(Arc::new(read));
        self
    }

    /// Read the open flag from the host (controlled)
    pub fn open<F>(mut self, read: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.config.open = Some(Arc::new(read));
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

    /// Activated item id, for menus used as a picker
    pub fn on_value_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.on_value_change = Some(Arc::new(callback));
        self
    }

    /// Proposed open flag
    pub fn on_open_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.config.on_open_change = Some(Arc::new(callback));
        self
    }

    /// Activated item id, for menus used as an action list
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.on_select = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Menu {
        let config = self.config;

        let mut selection = match config.value {
            Some(read) => SingleSelection::controlled(move || read()),
            None => SingleSelection::uncontrolled(config.default_value),
        };
        if let Some(cb) = config.on_value_change {
            selection = selection.on_change(move |v: &String| cb(v));
        }

        let mut root = OverlayDisclosure::new(config.registry).label("menu");
        if let Some(read) = config.open {
            root = root.controlled(move || read());
        }
        if let Some(cb) = config.on_open_change {
            root = root.on_open_change(move |open: &bool| cb(*open));
        }
        if let Some(node) = config.anchor {
            root = root.anchor(node);
        }
        if let Some(node) = config.panel {
            root = root.panel(node);
        }

        let nav = KeyboardNavigator::new(config.items.len()).with_home_end();
        Menu {
            coordinator: SubmenuCoordinator::new(root, config.items),
            nav,
            selection,
            on_select: config.on_select,
            disabled: config.disabled,
        }
    }
}

/// Create a menu builder
pub fn menu(registry: &DismissRegistry) -> MenuBuilder {
    MenuBuilder::new(registry)
}

/// Dropdown action menu
pub struct Menu {
    coordinator: SubmenuCoordinator,
    nav: KeyboardNavigator,
    selection: SingleSelection,
    on_select: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    disabled: bool,
}

impl Menu {
    pub fn value(&self) -> Option<String> {
        self.selection.read()
    }

    pub fn focus_index(&self) -> isize {
        self.nav.focus_index()
    }

    pub fn coordinator(&self) -> &SubmenuCoordinator {
        &self.coordinator
    }

    /// Trigger clicked
    pub fn click_trigger(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        if self.coordinator.is_open() {
            self.coordinator.close_all(CloseReason::Explicit)
        } else {
            self.open_menu()
        }
    }

    /// Pointer entered item `index` at `level`
    pub fn hover_item(&mut self, level: usize, index: usize) -> bool {
        if !self.coordinator.is_open() {
            return false;
        }
        let focused = level == 0 && self.nav.focus(index);
        self.coordinator.hover_enter(level, index) || focused
    }

    /// Pointer left item `index` at `level`
    pub fn leave_item(&mut self, level: usize, index: usize) -> bool {
        self.coordinator.hover_leave(level, index)
    }

    /// Item clicked
    pub fn click_item(&mut self, level: usize, index: usize) -> bool {
        !self.disabled && self.activate(level, index)
    }

    /// Register the panel node of the submenu opened from `level`
    pub fn attach_submenu_panel(&mut self, level: usize, node: NodeId) -> bool {
        self.coordinator.attach_panel(level, node)
    }

    /// Replace the items, closing any open submenu
    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        self.nav.reset(items.len());
        self.coordinator.set_items(items);
    }

    fn open_menu(&mut self) -> bool {
        let opened = self.coordinator.open();
        if opened {
            self.nav.reset(self.coordinator.items().len());
        }
        opened
    }

    fn activate(&mut self, level: usize, index: usize) -> bool {
        match self.coordinator.click(level, index) {
            MenuActivation::Leaf { id, .. } => {
                tracing::debug!(id = %id, "menu item activated");
                self.selection.commit(id.clone());
                if let Some(ref cb) = self.on_select {
                    cb(&id);
                }
                true
            }
            MenuActivation::Ignored => false,
        }
    }
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("coordinator", &self.coordinator)
            .field("nav", &self.nav)
            .field("selection", &self.selection)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl Widget for Menu {
    type View = MenuView;

    fn kind(&self) -> WidgetKind {
        WidgetKind::Menu
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool> {
        if self.disabled {
            return Ok(false);
        }
        self.coordinator.root_mut().sync();

        if !self.coordinator.is_open() {
            let opens = matches!(event.key, Key::Enter | Key::Space | Key::ArrowDown);
            return Ok(opens && self.open_menu());
        }

        let handled = match event.key {
            Key::ArrowDown => self.nav.move_next().is_some(),
            Key::ArrowUp => self.nav.move_prev().is_some(),
            Key::Home => self.nav.move_first().is_some(),
            Key::End => self.nav.move_last().is_some(),
            Key::Enter | Key::Space => match self.nav.focused() {
                Some(index) => self.activate(0, index),
                None => self.coordinator.close_all(CloseReason::Explicit),
            },
            Key::Escape => self.coordinator.handle_escape(),
            _ => false,
        };
        Ok(handled)
    }

    fn handle_pointer_down(&mut self, target: NodeId, containment: &dyn Containment) -> bool {
        self.coordinator.handle_pointer_down(target, containment)
    }

    fn is_open(&self) -> bool {
        self.coordinator.is_open()
    }

    fn view(&self) -> MenuView {
        let value = self.value();
        let levels = if self.is_open() {
            level_views(&self.coordinator, self.nav.focused(), value.as_deref())
        } else {
            Vec::new()
        };
        MenuView {
            open: self.is_open(),
            disabled: self.disabled,
            focus_index: self.focus_index(),
            value,
            levels,
        }
    }
}
