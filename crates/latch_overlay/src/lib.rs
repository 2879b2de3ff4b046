//! Latch Overlay
//!
//! Open/close state for floating panels:
//!
//! - **Disclosure**: `Closed`/`Open` state machine with outside-click and Escape dismissal
//! - **Dismiss Registry**: the document-level listener set, one guard per open overlay
//! - **Submenus**: nested menus with a single active submenu per level
//!
//! Overlays never look for each other implicitly. A submenu receives its
//! parent's region explicitly, and every overlay receives the registry it
//! registers with.

pub mod disclosure;
pub mod registry;
pub mod submenu;

pub use disclosure::{CloseReason, DisclosureEvent, DisclosureState, OverlayDisclosure};
pub use registry::{
    dismiss_registry, DismissEvent, DismissHandle, DismissPolicy, DismissRegion, DismissRegistry,
    DismissRegistryExt, DismissRegistryInner, DismissSubscription,
};
pub use submenu::{MenuActivation, MenuItem, MenuItemKind, MenuPath, SubmenuCoordinator};
