//! CommandPalette component - Ctrl/Cmd+K command search
//!
//! A modal command list. The chord toggles it; opening clears the search and
//! focuses the first command. Commands match on id, label or keywords and are
//! shown under their group headings in first-appearance order.
//!
//! # Example
//!
//! ```rust
//! use latch_cn::prelude::*;
//!
//! let registry = dismiss_registry();
//! let mut palette = cn::command_palette(&registry)
//!     .command(Command::new("home", "Go to Home").group("Navigation"))
//!     .command(
//!         Command::new("theme", "Toggle Theme")
//!             .group("Preferences")
//!             .keywords(["dark", "light"]),
//!     )
//!     .on_select(|id| println!("run {}", id))
//!     .build();
//!
//! let chord = KeyEvent::named("k").with_modifiers(Modifiers::ctrl());
//! palette.handle_key(&chord).unwrap();
//! palette.set_search("dark").unwrap();
//! palette.handle_key(&KeyEvent::named("Enter")).unwrap();
//!
//! assert!(!palette.is_open());
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use latch_core::{Containment, KeyEvent, NavigationOutcome, NodeId, OptionFilter, SelectOption};
use latch_overlay::{CloseReason, DismissRegistry, OverlayDisclosure};

use super::listbox::Listbox;
use crate::error::Result;
use crate::widget::{Widget, WidgetKind};

/// A palette entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub option: SelectOption,
    pub group: Option<String>,
    /// Shortcut hint (display only)
    pub shortcut: Option<String>,
}

impl Command {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            option: SelectOption::new(id, label),
            group: None,
            shortcut: None,
        }
    }

    pub fn group(mut self, heading: impl Into<String>) -> Self {
        self.group = Some(heading.into());
        self
    }

    /// Extra search terms
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option = self.option.keywords(keywords);
        self
    }

    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.option = self.option.disabled();
        self
    }

    pub fn id(&self) -> &str {
        &self.option.value
    }
}

/// One visible command
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandRowView {
    /// Row index used by `hover_item`/`click_item`
    pub row: usize,
    pub id: String,
    pub label: String,
    pub shortcut: Option<String>,
    pub disabled: bool,
    pub focused: bool,
}

/// Commands sharing a heading
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandGroupView {
    pub heading: Option<String>,
    pub items: Vec<CommandRowView>,
}

/// View model for a [`CommandPalette`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandPaletteView {
    pub open: bool,
    pub search: String,
    pub placeholder: String,
    /// Chord hint, shown while the search is empty
    pub shortcut_hint: Option<String>,
    pub focus_index: isize,
    pub groups: Vec<CommandGroupView>,
    /// Nothing matches the search
    pub empty: bool,
}

type CommandAction = Arc<dyn Fn() + Send + Sync>;

struct CommandPaletteConfig {
    registry: DismissRegistry,
    commands: Vec<(Command, Option<CommandAction>)>,
    placeholder: String,
    shortcut_hint: Option<String>,
    enable_shortcut: bool,
    open: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
    panel: Option<NodeId>,
    on_open_change: Option<Arc<dyn Fn(bool) + Send + Sync>>,
    on_select: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

/// Builder for [`CommandPalette`]
pub struct CommandPaletteBuilder {
    config: CommandPaletteConfig,
}

impl CommandPaletteBuilder {
    pub fn new(registry: &DismissRegistry) -> Self {
        Self {
            config: CommandPaletteConfig {
                registry: Arc::clone(registry),
                commands: Vec::new(),
                placeholder: "Type a command or search...".to_string(),
                shortcut_hint: Some("⌘K".to_string()),
                enable_shortcut: true,
                open: None,
                panel: None,
                on_open_change: None,
                on_select: None,
            },
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.config.commands.push((command, None));
        self
    }

    /// Add a command with its own action
    pub fn command_with<F>(mut self, command: Command, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config.commands.push((command, Some(Arc::new(action))));
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.placeholder = placeholder.into();
        self
    }

    /// Chord hint shown in the input; `None` hides it
    pub fn shortcut_hint(mut self, hint: Option<String>) -> Self {
        self.config.shortcut_hint = hint;
        self
    }

    /// Listen for Ctrl/Cmd+K (default true)
    pub fn enable_shortcut(mut self, enable: bool) -> Self {
        self.config.enable_shortcut = enable;
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

    pub fn on_open_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.config.on_open_change = Some(Arc::new(callback));
        self
    }

    /// Called with the command id after any command runs
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.on_select = Some(Arc::new(callback));
        self
    }

    /// Dialog content node; the backdrop is outside it
    pub fn panel(mut self, node: NodeId) -> Self {
        self.config.panel = Some(node);
        self
    }

    pub fn build(self) -> CommandPalette {
        let config = self.config;

        // Display order: groups in first-appearance order
        let mut grouped: IndexMap<Option<String>, Vec<(Command, Option<CommandAction>)>> =
            IndexMap::new();
        for (command, action) in config.commands {
            grouped
                .entry(command.group.clone())
                .or_default()
                .push((command, action));
        }

        let mut options = Vec::new();
        let mut entries = Vec::new();
        for (command, action) in grouped.into_values().flatten() {
            options.push(command.option.clone());
            entries.push(CommandEntry {
                group: command.group,
                shortcut: command.shortcut,
                action,
            });
        }

        let mut disclosure = OverlayDisclosure::new(config.registry).label("command_palette");
        if let Some(read) = config.open {
            disclosure = disclosure.controlled(move || read());
        }
        if let Some(cb) = config.on_open_change {
            disclosure = disclosure.on_open_change(move |open: &bool| cb(*open));
        }
        if let Some(node) = config.panel {
            disclosure = disclosure.panel(node);
        }

        CommandPalette {
            listbox: Listbox::new(options, OptionFilter::LabelOrKeywords),
            entries,
            disclosure,
            placeholder: config.placeholder,
            shortcut_hint: config.shortcut_hint,
            enable_shortcut: config.enable_shortcut,
            on_select: config.on_select,
        }
    }
}

/// Create a command palette builder
pub fn command_palette(registry: &DismissRegistry) -> CommandPaletteBuilder {
    CommandPaletteBuilder::new(registry)
}

struct CommandEntry {
    group: Option<String>,
    shortcut: Option<String>,
    action: Option<CommandAction>,
}

/// Searchable command list
pub struct CommandPalette {
    listbox: Listbox,
    /// Parallel to the listbox options
    entries: Vec<CommandEntry>,
    disclosure: OverlayDisclosure,
    placeholder: String,
    shortcut_hint: Option<String>,
    enable_shortcut: bool,
    on_select: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl CommandPalette {
    pub fn search(&self) -> &str {
        self.listbox.search()
    }

    pub fn focus_index(&self) -> isize {
        self.listbox.nav().focus_index()
    }

    pub fn open(&mut self) -> bool {
        let opened = self.disclosure.open();
        if opened {
            self.listbox.clear_search();
            self.focus_first();
        }
        opened
    }

    pub fn close(&mut self) -> bool {
        self.disclosure.close(CloseReason::Explicit)
    }

    pub fn toggle(&mut self) -> bool {
        if self.disclosure.is_open() {
            self.close()
        } else {
            self.open()
        }
    }

    /// Search text changed; focus moves to the first match
    pub fn set_search(&mut self, text: &str) -> Result<bool> {
        if !self.disclosure.is_open() {
            return Ok(false);
        }
        let changed = self.listbox.set_search(text)?;
        if changed {
            self.focus_first();
        }
        Ok(changed)
    }

    /// Clear button in the input
    pub fn clear_search(&mut self) -> bool {
        if self.listbox.search().is_empty() {
            return false;
        }
        self.listbox.clear_search();
        self.focus_first();
        true
    }

    /// Pointer entered a row; disabled rows keep the current focus
    pub fn hover_item(&mut self, row: usize) -> bool {
        if !self.disclosure.is_open() {
            return false;
        }
        match self.listbox.option_at(row) {
            Some(option) if option.is_disabled() => false,
            Some(_) => self.listbox.hover(row),
            None => false,
        }
    }

    /// Row clicked
    pub fn click_item(&mut self, row: usize) -> bool {
        self.disclosure.is_open() && self.run(row)
    }

    fn focus_first(&mut self) {
        self.listbox.nav_mut().move_first();
    }

    fn run(&mut self, row: usize) -> bool {
        let Some(option) = self.listbox.option_at(row) else {
            return false;
        };
        if option.is_disabled() {
            tracing::trace!(id = %option.value, "disabled command ignored");
            return false;
        }
        let id = option.value.clone();
        let Some(index) = self.listbox.visible().get(row).copied() else {
            return false;
        };

        tracing::debug!(id = %id, "command selected");
        if let Some(action) = self.entries.get(index).and_then(|e| e.action.clone()) {
            action();
        }
        if let Some(ref cb) = self.on_select {
            cb(&id);
        }
        self.disclosure.close(CloseReason::Commit);
        true
    }

    fn groups(&self) -> Vec<CommandGroupView> {
        let focused = self.listbox.focused_row();
        let mut groups: Vec<CommandGroupView> = Vec::new();

        for (row, &index) in self.listbox.visible().iter().enumerate() {
            let (Some(option), Some(entry)) =
                (self.listbox.options().get(index), self.entries.get(index))
            else {
                continue;
            };
            let item = CommandRowView {
                row,
                id: option.value.clone(),
                label: option.label.clone(),
                shortcut: entry.shortcut.clone(),
                disabled: option.is_disabled(),
                focused: focused == Some(row),
            };
            match groups.last_mut() {
                Some(group) if group.heading == entry.group => group.items.push(item),
                _ => groups.push(CommandGroupView {
                    heading: entry.group.clone(),
                    items: vec![item],
                }),
            }
        }
        groups
    }
}

impl fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandPalette")
            .field("listbox", &self.listbox)
            .field("disclosure", &self.disclosure)
            .field("enable_shortcut", &self.enable_shortcut)
            .finish()
    }
}

impl Widget for CommandPalette {
    type View = CommandPaletteView;

    fn kind(&self) -> WidgetKind {
        WidgetKind::CommandPalette
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<bool> {
        self.disclosure.sync();

        if self.enable_shortcut && event.is_command_chord('k') {
            return Ok(self.toggle());
        }
        if !self.disclosure.is_open() {
            return Ok(false);
        }

        let handled = match self.listbox.nav_mut().handle_key(event) {
            NavigationOutcome::Moved => true,
            NavigationOutcome::Commit(Some(row)) => self.run(row),
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

    fn view(&self) -> CommandPaletteView {
        let open = self.is_open();
        let groups = if open { self.groups() } else { Vec::new() };
        CommandPaletteView {
            open,
            search: self.listbox.search().to_string(),
            placeholder: self.placeholder.clone(),
            shortcut_hint: self
                .shortcut_hint
                .clone()
                .filter(|_| self.listbox.search().is_empty()),
            focus_index: self.focus_index(),
            empty: open && groups.is_empty(),
            groups,
        }
    }
}
