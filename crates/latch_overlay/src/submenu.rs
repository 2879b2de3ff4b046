//! Nested menus with hover-activated submenus
//!
//! A menu is a tree of [`MenuItem`]s. Level 0 is the top-level panel; every
//! open submenu adds one level. [`SubmenuCoordinator`] keeps, per level, at
//! most one active parent item, and owns one [`OverlayDisclosure`] per open
//! submenu so each level has its own dismiss listener.
//!
//! - hovering a parent item opens its submenu and collapses any deeper level
//! - leaving the active parent item closes its submenu
//! - clicking an enabled leaf closes every level, deepest first
//! - separators, disabled items and parent items ignore clicks

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use latch_core::{Availability, Containment, NodeId};

use crate::disclosure::{CloseReason, OverlayDisclosure};
use crate::registry::DismissRegion;

/// Index path from the top-level menu down to an item
pub type MenuPath = SmallVec<[usize; 4]>;

// =============================================================================
// MenuItem
// =============================================================================

/// A menu entry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Value reported when the item is activated
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub availability: Availability,
    /// Keyboard shortcut hint (display only)
    #[serde(default)]
    pub shortcut: Option<String>,
    #[serde(default)]
    pub separator: bool,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

/// What kind of entry a [`MenuItem`] is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItemKind<'a> {
    Action,
    Separator,
    Submenu(&'a [MenuItem]),
}

impl MenuItem {
    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn submenu(
        id: impl Into<String>,
        label: impl Into<String>,
        children: impl IntoIterator<Item = MenuItem>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: children.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn separator() -> Self {
        Self {
            separator: true,
            ..Default::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.availability = Availability::Disabled;
        self
    }

    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn kind(&self) -> MenuItemKind<'_> {
        if self.separator {
            MenuItemKind::Separator
        } else if !self.children.is_empty() {
            MenuItemKind::Submenu(&self.children)
        } else {
            MenuItemKind::Action
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.availability.is_disabled()
    }

    /// Separators and disabled items cannot be activated or opened
    pub fn is_inert(&self) -> bool {
        self.separator || self.is_disabled()
    }
}

/// Result of clicking a menu item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuActivation {
    /// An enabled leaf ran; every level is now closed
    Leaf { path: MenuPath, id: String },
    /// Nothing happened
    Ignored,
}

// =============================================================================
// SubmenuCoordinator
// =============================================================================

/// Open state of a menu and its nested submenus
#[derive(Debug)]
pub struct SubmenuCoordinator {
    items: Vec<MenuItem>,
    root: OverlayDisclosure,
    /// Active parent index per level; `path[i]` opened `submenus[i]`
    path: MenuPath,
    submenus: Vec<OverlayDisclosure>,
}

impl SubmenuCoordinator {
    /// Wrap the top-level panel's disclosure
    pub fn new(root: OverlayDisclosure, items: Vec<MenuItem>) -> Self {
        Self {
            items,
            root,
            path: MenuPath::new(),
            submenus: Vec::new(),
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Replace the menu items, closing any open submenu
    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        self.collapse_to(0, CloseReason::Explicit);
        self.items = items;
    }

    /// Items shown at `level`, if that level is visible
    pub fn items_at(&self, level: usize) -> Option<&[MenuItem]> {
        if level > self.path.len() {
            return None;
        }
        let mut items = self.items.as_slice();
        for &index in &self.path[..level] {
            items = items.get(index)?.children.as_slice();
        }
        Some(items)
    }

    pub fn root(&self) -> &OverlayDisclosure {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut OverlayDisclosure {
        &mut self.root
    }

    pub fn is_open(&self) -> bool {
        self.root.is_open()
    }

    /// Active parent item at `level`
    pub fn active(&self, level: usize) -> Option<usize> {
        self.path.get(level).copied()
    }

    /// Active parent indices, top-level first
    pub fn active_path(&self) -> &[usize] {
        &self.path
    }

    /// Number of open submenus
    pub fn depth(&self) -> usize {
        self.submenus.len()
    }

    /// Disclosure of the submenu opened from `level`
    pub fn submenu(&self, level: usize) -> Option<&OverlayDisclosure> {
        self.submenus.get(level)
    }

    pub fn open(&mut self) -> bool {
        self.root.open()
    }

    pub fn toggle(&mut self) -> bool {
        if self.is_open() {
            self.close_all(CloseReason::Explicit)
        } else {
            self.open()
        }
    }

    /// Close every submenu, deepest first, then the top-level panel
    pub fn close_all(&mut self, reason: CloseReason) -> bool {
        let collapsed = self.collapse_to(0, reason);
        self.root.close(reason) || collapsed
    }

    /// Register the panel node of the submenu opened from `level`
    ///
    /// The node is added to that submenu's region and to every ancestor's, so
    /// clicks inside a submenu never count as outside its parents.
    pub fn attach_panel(&mut self, level: usize, node: NodeId) -> bool {
        if level >= self.submenus.len() {
            return false;
        }
        self.root.include(node);
        for submenu in self.submenus.iter_mut().take(level + 1) {
            submenu.include(node);
        }
        true
    }

    /// Pointer entered item `index` at `level`
    ///
    /// Returns whether the open submenus changed.
    pub fn hover_enter(&mut self, level: usize, index: usize) -> bool {
        if !self.is_open() {
            return false;
        }
        let Some(item) = self.items_at(level).and_then(|items| items.get(index)) else {
            return false;
        };
        let opens_submenu = matches!(item.kind(), MenuItemKind::Submenu(_)) && !item.is_disabled();

        if opens_submenu && self.active(level) == Some(index) {
            return false;
        }

        let collapsed = self.collapse_to(level, CloseReason::Explicit);
        if !opens_submenu {
            return collapsed;
        }

        let parent_region = self.region_at(level).clone();
        let mut submenu = OverlayDisclosure::new(self.root.registry().clone())
            .within(&parent_region)
            .label("submenu");
        submenu.open();

        tracing::debug!("SubmenuCoordinator::hover_enter - level {} item {}", level, index);

        self.path.push(index);
        self.submenus.push(submenu);
        true
    }

    /// Pointer left item `index` at `level`
    pub fn hover_leave(&mut self, level: usize, index: usize) -> bool {
        if self.active(level) != Some(index) {
            return false;
        }
        self.collapse_to(level, CloseReason::Explicit)
    }

    /// Click on item `index` at `level`
    pub fn click(&mut self, level: usize, index: usize) -> MenuActivation {
        if !self.is_open() {
            return MenuActivation::Ignored;
        }
        let Some(item) = self.items_at(level).and_then(|items| items.get(index)) else {
            return MenuActivation::Ignored;
        };
        if item.is_inert() || !matches!(item.kind(), MenuItemKind::Action) {
            tracing::trace!(level, index, id = %item.id, "ignored menu click");
            return MenuActivation::Ignored;
        }

        let id = item.id.clone();
        let mut path: MenuPath = self.path.iter().take(level).copied().collect();
        path.push(index);

        self.close_all(CloseReason::Commit);
        MenuActivation::Leaf { path, id }
    }

    /// Document pointer-down
    ///
    /// Closes everything when the target is outside the deepest open level's
    /// region (which includes all of its ancestors).
    pub fn handle_pointer_down<C: Containment + ?Sized>(
        &mut self,
        target: NodeId,
        containment: &C,
    ) -> bool {
        self.root.sync();
        if !self.is_open() {
            return false;
        }
        if self.region_at(self.depth()).contains(target, containment) {
            return false;
        }
        self.close_all(CloseReason::OutsidePointer)
    }

    /// Escape closes the deepest submenu, or the menu itself when none is open
    pub fn handle_escape(&mut self) -> bool {
        if self.submenus.is_empty() {
            return self.root.handle_escape();
        }
        let level = self.submenus.len() - 1;
        self.collapse_to(level, CloseReason::Escape)
    }

    fn region_at(&self, level: usize) -> &DismissRegion {
        match level {
            0 => self.root.region(),
            n => self
                .submenus
                .get(n - 1)
                .map_or(self.root.region(), |s| s.region()),
        }
    }

    /// Close submenus until only `level` of them remain
    fn collapse_to(&mut self, level: usize, reason: CloseReason) -> bool {
        let mut changed = false;
        while self.submenus.len() > level {
            if let Some(mut submenu) = self.submenus.pop() {
                submenu.close(reason);
            }
            self.path.pop();
            changed = true;
        }
        if changed {
            tracing::debug!(
                "SubmenuCoordinator::collapse_to - {} level(s) open ({:?})",
                level,
                reason
            );
        }
        changed
    }
}
