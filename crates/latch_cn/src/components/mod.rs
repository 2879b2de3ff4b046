//! Headless overlay widgets
//!
//! Each component follows a consistent pattern:
//! - Builder function taking the dismiss registry (e.g., `combobox(&registry)`)
//! - Fluent builder ending in `build()`
//! - Event methods returning whether the host should re-render
//! - Implements [`Widget`](crate::widget::Widget) with a serializable view model

pub mod combobox;
pub mod command_palette;
pub mod context_menu;
pub mod date_picker;
pub mod listbox;
pub mod menu;
pub mod multi_select;
pub mod select;

pub use combobox::{combobox, Combobox, ComboboxBuilder, ComboboxView};
pub use command_palette::{
    command_palette, Command, CommandGroupView, CommandPalette, CommandPaletteBuilder,
    CommandPaletteView, CommandRowView,
};
pub use context_menu::{
    context_menu, ContextMenu, ContextMenuBuilder, ContextMenuView, MenuAction, MenuPosition,
};
pub use date_picker::{
    date_picker, DateSelectionMode, DatePicker, DatePickerBuilder, DatePickerView, DayCellView,
    Presentation,
};
pub use listbox::{Listbox, OptionRowView};
pub use menu::{menu, Menu, MenuBuilder, MenuItemView, MenuView};
pub use multi_select::{multi_select, ChipView, MultiSelect, MultiSelectBuilder, MultiSelectView};
pub use select::{select, Select, SelectBuilder, SelectView};
