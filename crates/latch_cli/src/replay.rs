//! Scenario replay
//!
//! Builds the configured widget against a small stage document and feeds it
//! the scenario steps, capturing the view model after each one.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use latch_cn::components::{
    combobox, command_palette, context_menu, date_picker, menu, multi_select, select, Combobox,
    CommandPalette, ContextMenu, DatePicker, Menu, MultiSelect, Select,
};
use latch_cn::{Widget, WidgetKind};
use latch_core::{NodeId, NodeTree};
use latch_overlay::{dismiss_registry, DismissRegistry, DismissRegistryExt};

use crate::scenario::{Scenario, Step, WidgetConfig};

// =============================================================================
// Stage
// =============================================================================

/// Host document the widget is mounted in
///
/// ```text
/// body
/// ├── trigger
/// ├── panel
/// │   └── row
/// └── outside
/// ```
pub struct Stage {
    pub tree: NodeTree,
    pub registry: DismissRegistry,
    pub trigger: NodeId,
    pub panel: NodeId,
    pub row: NodeId,
    pub outside: NodeId,
}

impl Stage {
    pub fn new() -> Result<Self> {
        let mut tree = NodeTree::new();
        let body = tree.create_root();
        let mut child = |parent: NodeId| {
            tree.create_child(parent)
                .context("Failed to create stage node")
        };
        let trigger = child(body)?;
        let panel = child(body)?;
        let row = child(panel)?;
        let outside = child(body)?;
        Ok(Self {
            tree,
            registry: dismiss_registry(),
            trigger,
            panel,
            row,
            outside,
        })
    }
}

// =============================================================================
// AnyWidget
// =============================================================================

/// One of the library widgets, chosen at runtime
#[derive(Debug)]
pub enum AnyWidget {
    Combobox(Combobox),
    Select(Select),
    MultiSelect(MultiSelect),
    Menu(Menu),
    ContextMenu(ContextMenu),
    DatePicker(DatePicker),
    CommandPalette(CommandPalette),
}

macro_rules! each_widget {
    ($value:expr, $w:ident => $body:expr) => {
        match $value {
            AnyWidget::Combobox($w) => $body,
            AnyWidget::Select($w) => $body,
            AnyWidget::MultiSelect($w) => $body,
            AnyWidget::Menu($w) => $body,
            AnyWidget::ContextMenu($w) => $body,
            AnyWidget::DatePicker($w) => $body,
            AnyWidget::CommandPalette($w) => $body,
        }
    };
}

impl AnyWidget {
    /// Build the widget described by `config`, wired to `stage`
    pub fn build(config: &WidgetConfig, stage: &Stage) -> Result<Self> {
        let kind = WidgetKind::from_name(&config.kind).with_context(|| {
            format!(
                "Unknown widget kind '{}'. Run `latch widgets` for the list",
                config.kind
            )
        })?;
        let registry = &stage.registry;

        let widget = match kind {
            WidgetKind::Combobox => {
                let mut builder = combobox(registry)
                    .options(config.options.iter().cloned())
                    .filter(config.filter.into())
                    .allow_custom(config.allow_custom)
                    .disabled(config.disabled)
                    .anchor(stage.trigger)
                    .panel(stage.panel)
                    .on_change(|value| info!(value = %value, "combobox changed"));
                if let Some(ref value) = config.value {
                    builder = builder.default_value(value.clone());
                }
                if let Some(ref placeholder) = config.placeholder {
                    builder = builder.placeholder(placeholder.clone());
                }
                AnyWidget::Combobox(builder.build())
            }
            WidgetKind::Select => {
                let mut builder = select(registry)
                    .options(config.options.iter().cloned())
                    .disabled(config.disabled)
                    .anchor(stage.trigger)
                    .panel(stage.panel)
                    .on_change(|value| info!(value = %value, "select changed"));
                if let Some(ref value) = config.value {
                    builder = builder.default_value(value.clone());
                }
                if let Some(ref placeholder) = config.placeholder {
                    builder = builder.placeholder(placeholder.clone());
                }
                AnyWidget::Select(builder.build())
            }
            WidgetKind::MultiSelect => {
                let mut builder = multi_select(registry)
                    .options(config.options.iter().cloned())
                    .default_values(config.values.iter().cloned())
                    .filter(config.filter.into())
                    .searchable(config.searchable)
                    .show_count(config.show_count)
                    .disabled(config.disabled)
                    .anchor(stage.trigger)
                    .panel(stage.panel)
                    .on_change(|values| {
                        info!(
                            values = ?values.iter().collect::<Vec<_>>(),
                            "multi_select changed"
                        )
                    });
                if let Some(max) = config.max {
                    builder = builder.max(max);
                }
                if let Some(ref placeholder) = config.placeholder {
                    builder = builder.placeholder(placeholder.clone());
                }
                AnyWidget::MultiSelect(builder.build())
            }
            WidgetKind::Menu => {
                let mut builder = menu(registry)
                    .items(config.items.iter().cloned())
                    .disabled(config.disabled)
                    .anchor(stage.trigger)
                    .panel(stage.panel)
                    .on_select(|id| info!(id = %id, "menu item selected"))
                    .on_open_change(|open| debug!(open, "menu open changed"));
                if let Some(ref value) = config.value {
                    builder = builder.default_value(value.clone());
                }
                AnyWidget::Menu(builder.build())
            }
            WidgetKind::ContextMenu => {
                let mut builder = context_menu(registry)
                    .panel(stage.panel)
                    .on_select(|id| info!(id = %id, "context menu item selected"));
                for item in &config.items {
                    builder = builder.item(item.clone());
                }
                AnyWidget::ContextMenu(builder.build())
            }
            WidgetKind::DatePicker => {
                let mut builder = date_picker(registry)
                    .disabled(config.disabled)
                    .anchor(stage.trigger)
                    .panel(stage.panel)
                    .on_change(|date| info!(date = %date, "date changed"))
                    .on_range_change(|range| {
                        info!(start = ?range.start, end = ?range.end, "range changed")
                    });
                if config.range {
                    builder = builder.range();
                }
                if config.popover {
                    builder = builder.popover();
                }
                if let Some(date) = config.date {
                    builder = builder.default_value(date);
                }
                if let Some(range) = config.date_range {
                    builder = builder.default_range(range);
                }
                if let Some(date) = config.month {
                    builder = builder.month(date);
                }
                if let Some(date) = config.min_date {
                    builder = builder.min_date(date);
                }
                if let Some(date) = config.max_date {
                    builder = builder.max_date(date);
                }
                if let Some(weekday) = config.week_start()? {
                    builder = builder.week_start(weekday);
                }
                AnyWidget::DatePicker(builder.build()?)
            }
            WidgetKind::CommandPalette => {
                let mut builder = command_palette(registry)
                    .enable_shortcut(true)
                    .panel(stage.panel)
                    .on_select(|id| info!(id = %id, "command run"))
                    .on_open_change(|open| debug!(open, "palette open changed"));
                for command in &config.commands {
                    builder = builder.command(command.to_command());
                }
                if let Some(ref placeholder) = config.placeholder {
                    builder = builder.placeholder(placeholder.clone());
                }
                AnyWidget::CommandPalette(builder.build())
            }
        };

        Ok(widget)
    }

    pub fn kind(&self) -> WidgetKind {
        each_widget!(self, w => w.kind())
    }

    pub fn is_open(&self) -> bool {
        each_widget!(self, w => w.is_open())
    }

    pub fn view_json(&self) -> Result<Value> {
        each_widget!(self, w => Ok(serde_json::to_value(w.view())?))
    }

    /// Deliver one step; `Ok(true)` when the widget changed
    pub fn apply(&mut self, step: &Step, stage: &Stage) -> Result<bool> {
        if let Some(event) = step.key_event() {
            return each_widget!(self, w => Ok(w.handle_key(&event)?));
        }

        let changed = match (step, &mut *self) {
            (Step::PointerOutside, widget) => {
                each_widget!(widget, w => w.handle_pointer_down(stage.outside, &stage.tree))
            }
            (Step::PointerInside, widget) => {
                each_widget!(widget, w => w.handle_pointer_down(stage.row, &stage.tree))
            }

            (Step::Type { text }, AnyWidget::Combobox(w)) => w.set_search(text)?,
            (Step::Type { text }, AnyWidget::MultiSelect(w)) => w.set_search(text)?,
            (Step::Type { text }, AnyWidget::CommandPalette(w)) => w.set_search(text)?,

            (Step::ClickTrigger, AnyWidget::Combobox(w)) => w.click_trigger(),
            (Step::ClickTrigger, AnyWidget::Select(w)) => w.click_trigger(),
            (Step::ClickTrigger, AnyWidget::MultiSelect(w)) => w.click_trigger(),
            (Step::ClickTrigger, AnyWidget::Menu(w)) => w.click_trigger(),
            (Step::ClickTrigger, AnyWidget::DatePicker(w)) => w.click_trigger(),
            (Step::ClickTrigger, AnyWidget::CommandPalette(w)) => w.toggle(),

            (Step::ClickOption { row }, AnyWidget::Combobox(w)) => w.click_option(*row),
            (Step::ClickOption { row }, AnyWidget::Select(w)) => w.click_option(*row),
            (Step::ClickOption { row }, AnyWidget::MultiSelect(w)) => w.click_option(*row),
            (Step::ClickOption { row }, AnyWidget::CommandPalette(w)) => w.click_item(*row),

            (Step::HoverOption { row }, AnyWidget::Combobox(w)) => w.hover_option(*row),
            (Step::HoverOption { row }, AnyWidget::Select(w)) => w.hover_option(*row),
            (Step::HoverOption { row }, AnyWidget::MultiSelect(w)) => w.hover_option(*row),
            (Step::HoverOption { row }, AnyWidget::CommandPalette(w)) => w.hover_item(*row),

            (Step::HoverItem { level, index }, AnyWidget::Menu(w)) => w.hover_item(*level, *index),
            (Step::HoverItem { level, index }, AnyWidget::ContextMenu(w)) => {
                w.hover_item(*level, *index)
            }
            (Step::LeaveItem { level, index }, AnyWidget::Menu(w)) => w.leave_item(*level, *index),
            (Step::LeaveItem { level, index }, AnyWidget::ContextMenu(w)) => {
                w.leave_item(*level, *index)
            }
            (Step::ClickItem { level, index }, AnyWidget::Menu(w)) => w.click_item(*level, *index),
            (Step::ClickItem { level, index }, AnyWidget::ContextMenu(w)) => {
                w.click_item(*level, *index)
            }
            (Step::OpenAt { x, y }, AnyWidget::ContextMenu(w)) => w.open_at(*x, *y),

            (Step::ClickDate { date }, AnyWidget::DatePicker(w)) => w.click_date(*date),
            (Step::NextMonth, AnyWidget::DatePicker(w)) => w.next_month()?,
            (Step::PrevMonth, AnyWidget::DatePicker(w)) => w.prev_month()?,
            (Step::Clear, AnyWidget::DatePicker(w)) => w.clear_range(),

            (Step::Remove { value }, AnyWidget::MultiSelect(w)) => w.remove_chip(value),
            (Step::Clear, AnyWidget::MultiSelect(w)) => w.clear(),

            (step, widget) => anyhow::bail!(
                "'{}' does not apply to a {}",
                step.describe(),
                widget.kind().name()
            ),
        };

        Ok(changed)
    }
}

// =============================================================================
// Replay
// =============================================================================

/// Widget state after one step
#[derive(Debug, Serialize)]
pub struct Frame {
    pub step: usize,
    pub action: String,
    pub changed: bool,
    pub open: bool,
    /// Live dismiss listeners in the stage registry
    pub listeners: usize,
    pub view: Value,
}

/// Replay every step, returning the initial frame followed by one per step
pub fn run(scenario: &Scenario) -> Result<Vec<Frame>> {
    let stage = Stage::new()?;
    let mut widget = AnyWidget::build(&scenario.widget, &stage)?;
    info!(
        kind = widget.kind().name(),
        steps = scenario.steps.len(),
        "Replaying scenario"
    );

    let mut frames = Vec::with_capacity(scenario.steps.len() + 1);
    frames.push(capture(0, "initial".to_string(), false, &widget, &stage)?);

    for (i, step) in scenario.steps.iter().enumerate() {
        let n = i + 1;
        let changed = widget
            .apply(step, &stage)
            .with_context(|| format!("Step {} ({}) failed", n, step.describe()))?;
        debug!(step = n, action = %step.describe(), changed, "step applied");
        frames.push(capture(n, step.describe(), changed, &widget, &stage)?);
    }

    Ok(frames)
}

fn capture(
    step: usize,
    action: String,
    changed: bool,
    widget: &AnyWidget,
    stage: &Stage,
) -> Result<Frame> {
    Ok(Frame {
        step,
        action,
        changed,
        open: widget.is_open(),
        listeners: stage.registry.listener_count(),
        view: widget.view_json()?,
    })
}
