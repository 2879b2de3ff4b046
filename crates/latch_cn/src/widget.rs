//! Common widget surface
//!
//! Each component exposes its own event methods (`click_option`, `set_search`,
//! `click_date`, ...). The handful of inputs every overlay widget accepts, and
//! its view model, are collected here so hosts can route document-level events
//! without knowing which widget they are talking to.

use serde::Serialize;

use latch_core::{Containment, KeyEvent, NodeId};

use crate::error::Result;

/// Kinds of widget in this library
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Combobox,
    Select,
    MultiSelect,
    Menu,
    ContextMenu,
    DatePicker,
    CommandPalette,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 7] = [
        WidgetKind::Combobox,
        WidgetKind::Select,
        WidgetKind::MultiSelect,
        WidgetKind::Menu,
        WidgetKind::ContextMenu,
        WidgetKind::DatePicker,
        WidgetKind::CommandPalette,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Combobox => "combobox",
            WidgetKind::Select => "select",
            WidgetKind::MultiSelect => "multi_select",
            WidgetKind::Menu => "menu",
            WidgetKind::ContextMenu => "context_menu",
            WidgetKind::DatePicker => "date_picker",
            WidgetKind::CommandPalette => "command_palette",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// One-line description
    pub fn summary(self) -> &'static str {
        match self {
            WidgetKind::Combobox => "single value with search and optional free text",
            WidgetKind::Select => "single value from a fixed list",
            WidgetKind::MultiSelect => "several values with an optional cap and chips",
            WidgetKind::Menu => "trigger-anchored action menu with submenus",
            WidgetKind::ContextMenu => "pointer-positioned action menu with submenus",
            WidgetKind::DatePicker => "calendar with single or range selection",
            WidgetKind::CommandPalette => "Ctrl/Cmd+K searchable command list",
        }
    }
}

/// Inputs and output shared by every widget
///
/// Handlers return `true` when the host should re-render.
pub trait Widget {
    type View: Serialize;

    fn kind(&self) -> WidgetKind;

    /// A key press while the widget (or its panel) has focus
    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool>;

    /// A pointer-down anywhere in the document
    fn handle_pointer_down(&mut self, target: NodeId, containment: &dyn Containment) -> bool;

    /// Whether the floating panel is open
    fn is_open(&self) -> bool;

    fn view(&self) -> Self::View;
}
