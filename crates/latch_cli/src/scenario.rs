//! Scenario files
//!
//! A scenario describes one widget and a list of input steps:
//!
//! ```toml
//! [widget]
//! kind = "combobox"
//! placeholder = "Pick a fruit"
//!
//! [[widget.options]]
//! value = "apple"
//! label = "Apple"
//!
//! [[steps]]
//! action = "click_trigger"
//!
//! [[steps]]
//! action = "key"
//! key = "ArrowDown"
//! ```
//!
//! Dates are written as quoted ISO strings (`"2024-03-01"`).

use anyhow::{Context, Result};
use chrono::{NaiveDate, Weekday};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use latch_calendar::DateRange;
use latch_core::{Availability, KeyEvent, Modifiers, OptionFilter, SelectOption};
use latch_cn::components::Command;
use latch_overlay::MenuItem;

// =============================================================================
// Scenario
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub widget: WidgetConfig,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Scenario {} does not exist", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

// =============================================================================
// Widget configuration
// =============================================================================

/// Widget under test; fields a kind does not use are ignored
#[derive(Debug, Deserialize)]
pub struct WidgetConfig {
    /// One of `latch widgets`
    pub kind: String,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub commands: Vec<CommandConfig>,

    /// Initial value (combobox, select, menu)
    #[serde(default)]
    pub value: Option<String>,
    /// Initial values (multi_select)
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub filter: FilterKind,

    #[serde(default)]
    pub allow_custom: bool,

    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default)]
    pub show_count: bool,

    /// Two-click range mode (date_picker)
    #[serde(default)]
    pub range: bool,
    /// Popover presentation (date_picker)
    #[serde(default)]
    pub popover: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub month: Option<NaiveDate>,
    #[serde(default)]
    pub min_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_date: Option<NaiveDate>,
    /// Weekday name, e.g. "sun" or "Monday"
    #[serde(default)]
    pub week_start: Option<String>,
}

fn default_true() -> bool {
    true
}

impl WidgetConfig {
    pub fn week_start(&self) -> Result<Option<Weekday>> {
        self.week_start
            .as_deref()
            .map(|name| {
                name.parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("Invalid week_start '{}'", name))
            })
            .transpose()
    }
}

/// Built-in filters selectable from a scenario
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Label,
    LabelOrKeywords,
}

impl From<FilterKind> for OptionFilter {
    fn from(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Label => OptionFilter::Label,
            FilterKind::LabelOrKeywords => OptionFilter::LabelOrKeywords,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommandConfig {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub shortcut: Option<String>,
    #[serde(default)]
    pub availability: Availability,
}

impl CommandConfig {
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(self.id.clone(), self.label.clone())
            .keywords(self.keywords.iter().cloned());
        if let Some(ref group) = self.group {
            command = command.group(group.clone());
        }
        if let Some(ref shortcut) = self.shortcut {
            command = command.shortcut(shortcut.clone());
        }
        if self.availability == Availability::Disabled {
            command = command.disabled();
        }
        command
    }
}

// =============================================================================
// Steps
// =============================================================================

/// One input delivered to the widget
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
    },
    /// Replace the search text
    Type { text: String },
    ClickTrigger,
    ClickOption { row: usize },
    HoverOption { row: usize },
    HoverItem { level: usize, index: usize },
    LeaveItem { level: usize, index: usize },
    ClickItem { level: usize, index: usize },
    OpenAt { x: f32, y: f32 },
    /// Pointer-down on a node outside every panel
    PointerOutside,
    /// Pointer-down on a row inside the panel
    PointerInside,
    ClickDate { date: NaiveDate },
    NextMonth,
    PrevMonth,
    /// Remove one chip (multi_select)
    Remove { value: String },
    Clear,
}

impl Step {
    /// Short description used in the replay log
    pub fn describe(&self) -> String {
        match self {
            Step::Key {
                key,
                ctrl,
                meta,
                shift,
                alt,
            } => {
                let mut chord = String::new();
                let held_keys = [
                    (*ctrl, "Ctrl+"),
                    (*meta, "Meta+"),
                    (*alt, "Alt+"),
                    (*shift, "Shift+"),
                ];
                for (held, name) in held_keys {
                    if held {
                        chord.push_str(name);
                    }
                }
                format!("key {}{}", chord, key)
            }
            Step::Type { text } => format!("type {:?}", text),
            Step::ClickTrigger => "click_trigger".to_string(),
            Step::ClickOption { row } => format!("click_option {}", row),
            Step::HoverOption { row } => format!("hover_option {}", row),
            Step::HoverItem { level, index } => format!("hover_item {}:{}", level, index),
            Step::LeaveItem { level, index } => format!("leave_item {}:{}", level, index),
            Step::ClickItem { level, index } => format!("click_item {}:{}", level, index),
            Step::OpenAt { x, y } => format!("open_at ({}, {})", x, y),
            Step::PointerOutside => "pointer_outside".to_string(),
            Step::PointerInside => "pointer_inside".to_string(),
            Step::ClickDate { date } => format!("click_date {}", date),
            Step::NextMonth => "next_month".to_string(),
            Step::PrevMonth => "prev_month".to_string(),
            Step::Remove { value } => format!("remove {}", value),
            Step::Clear => "clear".to_string(),
        }
    }

    /// Key event for a `key` step
    pub fn key_event(&self) -> Option<KeyEvent> {
        match self {
            Step::Key {
                key,
                ctrl,
                meta,
                shift,
                alt,
            } => Some(KeyEvent::named(key).with_modifiers(Modifiers {
                shift: *shift,
                ctrl: *ctrl,
                alt: *alt,
                meta: *meta,
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latch_core::Key;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_combobox_scenario() {
        let scenario = Scenario::parse(
            r#"
            [widget]
            kind = "combobox"
            allow_custom = true

            [[widget.options]]
            value = "apple"
            label = "Apple"

            [[widget.options]]
            value = "banana"
            label = "Banana"
            availability = "disabled"

            [[steps]]
            action = "type"
            text = "an"

            [[steps]]
            action = "key"
            key = "k"
            ctrl = true
            "#,
        )
        .unwrap();

        assert_eq!(scenario.widget.kind, "combobox");
        assert!(scenario.widget.allow_custom);
        assert!(scenario.widget.searchable);
        assert_eq!(scenario.widget.options.len(), 2);
        assert!(scenario.widget.options[1].is_disabled());
        assert_eq!(
            scenario.steps[0],
            Step::Type {
                text: "an".to_string()
            }
        );

        let event = scenario.steps[1].key_event().unwrap();
        assert_eq!(event.key, Key::Character('k'));
        assert!(event.modifiers.ctrl);
        assert_eq!(scenario.steps[1].describe(), "key Ctrl+k");
    }

    #[test]
    fn test_parse_dates_and_menu_items() {
        let scenario = Scenario::parse(
            r#"
            [widget]
            kind = "date_picker"
            range = true
            month = "2024-03-01"
            week_start = "sun"
            date_range = { start = "2024-03-04" }

            [[widget.items]]
            id = "file"
            label = "File"

            [[widget.items.children]]
            id = "open"
            label = "Open"

            [[steps]]
            action = "click_date"
            date = "2024-03-09"
            "#,
        )
        .unwrap();

        let widget = &scenario.widget;
        assert_eq!(widget.month, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(widget.week_start().unwrap(), Some(Weekday::Sun));
        assert_eq!(
            widget.date_range.unwrap().start,
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
        assert_eq!(widget.items[0].children[0].id, "open");
        assert_eq!(scenario.steps[0].describe(), "click_date 2024-03-09");
    }

    #[test]
    fn test_bad_week_start() {
        let scenario = Scenario::parse(
            r#"
            [widget]
            kind = "date_picker"
            week_start = "someday"
            "#,
        )
        .unwrap();
        assert!(scenario.widget.week_start().is_err());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = Scenario::parse(
            r#"
            [widget]
            kind = "select"

            [[steps]]
            action = "double_click"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_command_config() {
        let config = CommandConfig {
            id: "theme".to_string(),
            label: "Toggle theme".to_string(),
            group: Some("View".to_string()),
            keywords: vec!["dark".to_string()],
            shortcut: None,
            availability: Availability::Disabled,
        };
        let command = config.to_command();
        assert_eq!(command.id(), "theme");
        assert_eq!(command.group.as_deref(), Some("View"));
        assert!(command.option.is_disabled());
    }
}
