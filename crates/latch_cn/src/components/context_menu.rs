//! ContextMenu component - menu opened at the pointer
//!
//! The host reports a secondary click with [`ContextMenu::open_at`]. Leaves
//! carry actions; activating one runs it and closes every level. Only the
//! menu panels count as inside for outside-click dismissal.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use latch_cn::prelude::*;
//!
//! let copies = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&copies);
//!
//! let registry = dismiss_registry();
//! let mut ctx = cn::context_menu(&registry)
//!     .action("copy", "Copy", move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .separator()
//!     .action("paste", "Paste", || {})
//!     .build();
//!
//! ctx.open_at(120.0, 48.0);
//! ctx.click_item(0, 0);
//!
//! assert_eq!(copies.load(Ordering::SeqCst), 1);
//! assert!(!ctx.is_open());
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use latch_core::{Containment, Key, KeyEvent, NodeId};
use latch_overlay::{
    CloseReason, DismissRegistry, MenuActivation, MenuItem, OverlayDisclosure, SubmenuCoordinator,
};

use super::menu::{level_views, MenuItemView};
use crate::error::Result;
use crate::widget::{Widget, WidgetKind};

/// Action run when a leaf item is activated
pub type MenuAction = Arc<dyn Fn() + Send + Sync>;

/// Pointer position the menu opened at
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MenuPosition {
    pub x: f32,
    pub y: f32,
}

/// View model for a [`ContextMenu`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContextMenuView {
    pub open: bool,
    pub position: Option<MenuPosition>,
    pub levels: Vec<Vec<MenuItemView>>,
}

/// Builder for [`ContextMenu`]
pub struct ContextMenuBuilder {
    registry: DismissRegistry,
    items: Vec<MenuItem>,
    actions: IndexMap<String, MenuAction>,
    panel: Option<NodeId>,
    on_select: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl ContextMenuBuilder {
    pub fn new(registry: &DismissRegistry) -> Self {
        Self {
            registry: Arc::clone(registry),
            items: Vec::new(),
            actions: IndexMap::new(),
            panel: None,
            on_select: None,
        }
    }

    /// Add a leaf item with its action
    pub fn action<F>(mut self, id: impl Into<String>, label: impl Into<String>, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = id.into();
        self.items.push(MenuItem::action(id.clone(), label));
        self.actions.insert(id, Arc::new(action));
        self
    }

    /// Add any item (submenus, disabled or shortcut-annotated entries)
    pub fn item(mut self, item: MenuItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn separator(mut self) -> Self {
        self.items.push(MenuItem::separator());
        self
    }

    /// Register the action for an item id anywhere in the tree
    pub fn on_action<F>(mut self, id: impl Into<String>, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.actions.insert(id.into(), Arc::new(action));
        self
    }

    /// Called with the item id after any leaf runs
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_select = Some(Arc::new(callback));
        self
    }

    /// Top-level panel node
    pub fn panel(mut self, node: NodeId) -> Self {
        self.panel = Some(node);
        self
    }

    pub fn build(self) -> ContextMenu {
        let mut root = OverlayDisclosure::new(self.registry).label("context_menu");
        if let Some(node) = self.panel {
            root = root.panel(node);
        }
        ContextMenu {
            coordinator: SubmenuCoordinator::new(root, self.items),
            actions: self.actions,
            on_select: self.on_select,
            position: None,
        }
    }
}

/// Create a context menu builder
pub fn context_menu(registry: &DismissRegistry) -> ContextMenuBuilder {
    ContextMenuBuilder::new(registry)
}

/// Pointer-positioned action menu
pub struct ContextMenu {
    coordinator: SubmenuCoordinator,
    actions: IndexMap<String, MenuAction>,
    on_select: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    position: Option<MenuPosition>,
}

impl ContextMenu {
    /// Secondary click at `(x, y)`
    ///
    /// Opens the menu there, or moves it and collapses its submenus when it
    /// is already open.
    pub fn open_at(&mut self, x: f32, y: f32) -> bool {
        self.position = Some(MenuPosition { x, y });
        if self.coordinator.is_open() {
            if let Some(index) = self.coordinator.active(0) {
                self.coordinator.hover_leave(0, index);
            }
            return true;
        }
        self.coordinator.open()
    }

    pub fn position(&self) -> Option<MenuPosition> {
        self.position
    }

    pub fn coordinator(&self) -> &SubmenuCoordinator {
        &self.coordinator
    }

    pub fn close(&mut self) -> bool {
        self.coordinator.close_all(CloseReason::Explicit)
    }

    pub fn hover_item(&mut self, level: usize, index: usize) -> bool {
        self.coordinator.hover_enter(level, index)
    }

    pub fn leave_item(&mut self, level: usize, index: usize) -> bool {
        self.coordinator.hover_leave(level, index)
    }

    /// Item clicked; leaves run their action and close every level
    pub fn click_item(&mut self, level: usize, index: usize) -> bool {
        match self.coordinator.click(level, index) {
            MenuActivation::Leaf { id, .. } => {
                match self.actions.get(&id) {
                    Some(action) => action(),
                    None => tracing::debug!(id = %id, "context menu item has no action"),
                }
                if let Some(ref cb) = self.on_select {
                    cb(&id);
                }
                true
            }
            MenuActivation::Ignored => false,
        }
    }

    pub fn attach_submenu_panel(&mut self, level: usize, node: NodeId) -> bool {
        self.coordinator.attach_panel(level, node)
    }
}

impl fmt::Debug for ContextMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenu")
            .field("coordinator", &self.coordinator)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("position", &self.position)
            .finish()
    }
}

impl Widget for ContextMenu {
    type View = ContextMenuView;

    fn kind(&self) -> WidgetKind {
        WidgetKind::ContextMenu
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool> {
        Ok(event.key == Key::Escape && self.coordinator.handle_escape())
    }

    fn handle_pointer_down(&mut self, target: NodeId, containment: &dyn Containment) -> bool {
        self.coordinator.handle_pointer_down(target, containment)
    }

    fn is_open(&self) -> bool {
        self.coordinator.is_open()
    }

    fn view(&self) -> ContextMenuView {
        let open = self.is_open();
        ContextMenuView {
            open,
            position: self.position.filter(|_| open),
            levels: if open {
                level_views(&self.coordinator, None, None)
            } else {
                Vec::new()
            },
        }
    }
}
