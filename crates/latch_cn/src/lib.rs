//! # Latch Component Library (latch_cn)
//!
//! Headless overlay selection widgets built on `latch_core`, `latch_overlay`
//! and `latch_calendar`.
//!
//! ## Philosophy
//!
//! The widgets own behavior, never pixels. A host framework forwards its key
//! and pointer events, reads back a serializable view model, and draws it.
//!
//! - **Engine**: `latch_core` provides selection, filtering and keyboard navigation
//! - **Overlays**: `latch_overlay` provides open/close state and outside-click dismissal
//! - **Calendar**: `latch_calendar` provides month grids and date ranges
//! - **Components**: `latch_cn` composes them into complete widgets
//!
//! ## Example
//!
//! ```rust
//! use latch_cn::prelude::*;
//!
//! let registry = dismiss_registry();
//! let mut fruit = cn::combobox(&registry)
//!     .option("apple", "Apple")
//!     .option_disabled("banana", "Banana")
//!     .option("cherry", "Cherry")
//!     .build();
//!
//! // Enter on a disabled row does nothing
//! fruit.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
//! fruit.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
//! fruit.handle_key(&KeyEvent::named("Enter")).unwrap();
//! assert_eq!(fruit.value(), None);
//! assert!(fruit.is_open());
//!
//! fruit.handle_key(&KeyEvent::named("ArrowDown")).unwrap();
//! fruit.handle_key(&KeyEvent::named("Enter")).unwrap();
//! assert_eq!(fruit.value().as_deref(), Some("cherry"));
//! ```
//!
//! ## Components
//!
//! - **Combobox** - single value with search and optional free text
//! - **Select** - single value from a fixed list
//! - **MultiSelect** - several values with a cap, chips and a count badge
//! - **Menu** - trigger-anchored action menu with submenus
//! - **ContextMenu** - pointer-positioned action menu
//! - **DatePicker** - single date or range, inline or in a popover
//! - **CommandPalette** - Ctrl/Cmd+K searchable commands

pub mod components;
pub mod error;
pub mod widget;

pub use components::*;
pub use error::{LatchError, Result};
pub use widget::{Widget, WidgetKind};

/// Convenience module for accessing components with `cn::` prefix
pub mod cn {
    pub use crate::components::combobox::combobox;
    pub use crate::components::command_palette::command_palette;
    pub use crate::components::context_menu::context_menu;
    pub use crate::components::date_picker::date_picker;
    pub use crate::components::menu::menu;
    pub use crate::components::multi_select::multi_select;
    pub use crate::components::select::select;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cn;
    pub use crate::components::{
        Combobox, Command, CommandPalette, ContextMenu, DatePicker, DateSelectionMode, Menu,
        MultiSelect, Presentation, Select,
    };
    pub use crate::error::LatchError;
    pub use crate::widget::{Widget, WidgetKind};

    // Re-export the engine types hosts touch directly
    pub use latch_calendar::{DateBounds, DateRange};
    pub use latch_core::{
        Containment, Key, KeyEvent, Modifiers, NodeId, NodeTree, OptionFilter, SelectOption,
    };
    pub use latch_overlay::{dismiss_registry, DismissRegistry, MenuItem};
}

/// Shared fixture for widget tests
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use latch_core::{NodeId, NodeTree};
    use latch_overlay::{dismiss_registry, DismissRegistry, DismissRegistryExt};

    /// A document with a trigger, a panel holding one row, a detached
    /// floating node and an unrelated node
    pub struct Host {
        pub tree: NodeTree,
        pub registry: DismissRegistry,
        pub trigger: NodeId,
        pub panel: NodeId,
        pub row: NodeId,
        pub floating: NodeId,
        pub outside: NodeId,
    }

    impl Host {
        pub fn new() -> Self {
            let mut tree = NodeTree::new();
            let body = tree.create_root();
            let trigger = tree.create_child(body).unwrap();
            let panel = tree.create_child(body).unwrap();
            let row = tree.create_child(panel).unwrap();
            let floating = tree.create_child(body).unwrap();
            let outside = tree.create_child(body).unwrap();
            Self {
                tree,
                registry: dismiss_registry(),
                trigger,
                panel,
                row,
                floating,
                outside,
            }
        }

        pub fn registry_listeners(&self) -> usize {
            self.registry.listener_count()
        }
    }

    /// Callback that appends every value it receives to a shared log
    pub fn recorder<T: Clone + Send + 'static>(
    ) -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |v: &T| sink.lock().unwrap().push(v.clone()))
    }
}
