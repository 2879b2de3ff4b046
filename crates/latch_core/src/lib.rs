//! Latch Core
//!
//! This crate provides the headless building blocks shared by every Latch
//! overlay widget:
//!
//! - **Options**: the `{ value, label, availability }` rows a widget offers
//! - **Value Sources**: one abstraction for controlled and uncontrolled state
//! - **Selection**: single and multi value models with commit policies
//! - **Filtering**: case-insensitive search and custom predicates
//! - **Keyboard Navigation**: wrap-around focus traversal over a filtered list
//! - **Host Input**: key/pointer events and subtree containment
//!
//! Nothing in here renders. A host framework feeds events in, reads the
//! resulting state back out, and draws it however it likes.
//!
//! # Example
//!
//! ```rust
//! use latch_core::filter::{filter_options, OptionFilter};
//! use latch_core::navigator::KeyboardNavigator;
//! use latch_core::option::SelectOption;
//!
//! let options = vec![
//!     SelectOption::new("apple", "Apple"),
//!     SelectOption::new("banana", "Banana").disabled(),
//!     SelectOption::new("cherry", "Cherry"),
//! ];
//!
//! let filtered = filter_options(&options, "an", &OptionFilter::Label).unwrap();
//! assert_eq!(filtered, vec![1]);
//!
//! let mut nav = KeyboardNavigator::new(filtered.len());
//! nav.move_next();
//! assert_eq!(nav.focused(), Some(0));
//! ```

pub mod error;
pub mod events;
pub mod filter;
pub mod fsm;
pub mod navigator;
pub mod option;
pub mod selection;
pub mod tree;
pub mod value;

pub use error::FilterError;
pub use events::{Key, KeyEvent, Modifiers, PointerDown};
pub use filter::{custom_candidate, filter_options, FilterFn, OptionFilter};
pub use fsm::StateTransitions;
pub use navigator::{KeyboardNavigator, NavigationOutcome};
pub use option::{find_option, Availability, OptionIndex, SelectOption};
pub use selection::{
    CommitOutcome, MultiSelection, RejectReason, SelectionModel, SelectionState, SingleSelection,
};
pub use tree::{Containment, NodeId, NodeTree};
pub use value::{ChangeCallback, ReadFn, ValueSource};
