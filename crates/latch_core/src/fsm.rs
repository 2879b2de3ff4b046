//! Finite state machine trait
//!
//! Widget state machines (disclosure, range selection) describe their legal
//! moves as a pure `(state, event) -> Option<state>` table. `None` means the
//! event does not apply in the current state and must be ignored.

use std::fmt::Debug;
use std::hash::Hash;

/// A state with an explicit transition table
///
/// # Example
///
/// ```rust
/// use latch_core::StateTransitions;
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum Door { Shut, Ajar }
///
/// #[derive(Clone, Copy, Debug)]
/// enum Push { Open, Close }
///
/// impl StateTransitions for Door {
///     type Event = Push;
///     fn on_event(&self, event: Push) -> Option<Self> {
///         match (self, event) {
///             (Door::Shut, Push::Open) => Some(Door::Ajar),
///             (Door::Ajar, Push::Close) => Some(Door::Shut),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Door::Shut.on_event(Push::Open), Some(Door::Ajar));
/// assert_eq!(Door::Shut.on_event(Push::Close), None);
/// ```
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + Debug + 'static
{
    type Event: Copy + Debug;

    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: Self::Event) -> Option<Self>;
}
