//! Selection models
//!
//! [`SingleSelection`] holds at most one value; [`MultiSelection`] holds an
//! ordered set with an optional cap. Both can be controlled or uncontrolled
//! (see [`ValueSource`]) and report every accepted commit through their change
//! callback.
//!
//! Commit policy:
//!
//! - single commit always notifies, even when the value is unchanged
//! - multi commit toggles: committing a selected value removes it
//! - adding past the cap is dropped and does not notify
//! - disabled options are rejected by `commit_option`, the one place the
//!   availability tag is checked
//!
//! # Example
//!
//! ```rust
//! use latch_core::{CommitOutcome, MultiSelection, RejectReason};
//!
//! let mut tags = MultiSelection::uncontrolled([]).max(1);
//! assert_eq!(tags.commit("rust".to_string()), CommitOutcome::Selected);
//! assert_eq!(
//!     tags.commit("go".to_string()),
//!     CommitOutcome::Rejected(RejectReason::CapacityReached)
//! );
//! assert_eq!(tags.commit("rust".to_string()), CommitOutcome::Deselected);
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;

use crate::option::SelectOption;
use crate::value::{ChangeCallback, ValueSource};

/// Why a commit was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The option (or date) is disabled
    Disabled,
    /// Multi selection is already at `max`
    CapacityReached,
    /// Date lies outside the configured min/max bounds
    OutOfBounds,
}

/// Result of a commit attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    /// The value is now selected
    Selected,
    /// The value was toggled off
    Deselected,
    /// Nothing changed and no callback ran
    Rejected(RejectReason),
}

impl CommitOutcome {
    /// True when the commit reached the store/callback
    pub fn is_committed(self) -> bool {
        !matches!(self, CommitOutcome::Rejected(_))
    }
}

// ============================================================================
// Single
// ============================================================================

/// Zero-or-one selected value
pub struct SingleSelection<T = String> {
    source: ValueSource<Option<T>>,
    on_change: Option<ChangeCallback<T>>,
}

impl<T: Clone + PartialEq> SingleSelection<T> {
    /// Widget-owned value starting at `default`
    pub fn uncontrolled(default: Option<T>) -> Self {
        Self::from_source(ValueSource::owned(default))
    }

    /// Host-owned value read through `read`
    pub fn controlled<F>(read: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Self::from_source(ValueSource::external(read))
    }

    pub fn from_source(source: ValueSource<Option<T>>) -> Self {
        Self {
            source,
            on_change: None,
        }
    }

    /// Set the change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn read(&self) -> Option<T> {
        self.source.read()
    }

    pub fn is_selected(&self, value: &T) -> bool {
        self.read().as_ref() == Some(value)
    }

    pub fn is_controlled(&self) -> bool {
        self.source.is_controlled()
    }

    /// Commit a value
    ///
    /// Stores it when uncontrolled, then always notifies.
    pub fn commit(&mut self, value: T) -> CommitOutcome {
        self.source.write(Some(value.clone()));
        if let Some(ref cb) = self.on_change {
            cb(&value);
        }
        CommitOutcome::Selected
    }
}

impl SingleSelection<String> {
    /// Commit an option's value unless the option is disabled
    pub fn commit_option(&mut self, option: &SelectOption) -> CommitOutcome {
        if option.is_disabled() {
            tracing::trace!(value = %option.value, "rejected commit of disabled option");
            return CommitOutcome::Rejected(RejectReason::Disabled);
        }
        self.commit(option.value.clone())
    }
}

impl<T: Clone + PartialEq> Default for SingleSelection<T> {
    fn default() -> Self {
        Self::uncontrolled(None)
    }
}

impl<T: fmt::Debug> fmt::Debug for SingleSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleSelection")
            .field("source", &self.source)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

// ============================================================================
// Multi
// ============================================================================

/// Ordered set of selected values with an optional cap
pub struct MultiSelection<T = String>
where
    T: Hash + Eq,
{
    source: ValueSource<IndexSet<T>>,
    max: Option<usize>,
    on_change: Option<ChangeCallback<IndexSet<T>>>,
}

impl<T: Clone + Hash + Eq> MultiSelection<T> {
    /// Widget-owned set starting with `defaults`
    pub fn uncontrolled(defaults: impl IntoIterator<Item = T>) -> Self {
        Self::from_source(ValueSource::owned(defaults.into_iter().collect()))
    }

    /// Host-owned set read through `read`
    pub fn controlled<F>(read: F) -> Self
    where
        F: Fn() -> IndexSet<T> + Send + Sync + 'static,
    {
        Self::from_source(ValueSource::external(read))
    }

    pub fn from_source(source: ValueSource<IndexSet<T>>) -> Self {
        Self {
            source,
            max: None,
            on_change: None,
        }
    }

    /// Cap the number of selected values
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Set or clear the cap
    pub fn with_max(mut self, max: Option<usize>) -> Self {
        self.max = max;
        self
    }

    /// Set the change callback (receives the whole proposed set)
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&IndexSet<T>) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn read(&self) -> IndexSet<T> {
        self.source.read()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.max
    }

    pub fn contains(&self, value: &T) -> bool {
        self.read().contains(value)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when another add would be rejected
    pub fn is_full(&self) -> bool {
        self.max.is_some_and(|max| self.len() >= max)
    }

    pub fn is_controlled(&self) -> bool {
        self.source.is_controlled()
    }

    /// Toggle a value
    pub fn commit(&mut self, value: T) -> CommitOutcome {
        let mut next = self.read();
        let outcome = if next.shift_remove(&value) {
            CommitOutcome::Deselected
        } else if self.max.is_some_and(|max| next.len() >= max) {
            tracing::trace!(max = ?self.max, "multi selection at capacity");
            return CommitOutcome::Rejected(RejectReason::CapacityReached);
        } else {
            next.insert(value);
            CommitOutcome::Selected
        };
        self.publish(next);
        outcome
    }

    /// Remove a value if present (chip removal)
    pub fn remove(&mut self, value: &T) -> bool {
        let mut next = self.read();
        if !next.shift_remove(value) {
            return false;
        }
        self.publish(next);
        true
    }

    /// Remove every value
    pub fn clear(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.publish(IndexSet::new());
        true
    }

    fn publish(&mut self, next: IndexSet<T>) {
        if let Some(ref cb) = self.on_change {
            cb(&next);
        }
        self.source.write(next);
    }
}

impl MultiSelection<String> {
    /// Toggle an option's value unless the option is disabled
    pub fn commit_option(&mut self, option: &SelectOption) -> CommitOutcome {
        if option.is_disabled() {
            tracing::trace!(value = %option.value, "rejected toggle of disabled option");
            return CommitOutcome::Rejected(RejectReason::Disabled);
        }
        self.commit(option.value.clone())
    }
}

impl<T: Clone + Hash + Eq> Default for MultiSelection<T> {
    fn default() -> Self {
        Self::uncontrolled(std::iter::empty())
    }
}

impl<T: fmt::Debug + Hash + Eq> fmt::Debug for MultiSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelection")
            .field("source", &self.source)
            .field("max", &self.max)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

// ============================================================================
// Either
// ============================================================================

/// Snapshot of a selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Single(Option<String>),
    Multi(IndexSet<String>),
}

impl SelectionState {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            SelectionState::Single(v) => v.as_deref() == Some(value),
            SelectionState::Multi(set) => set.contains(value),
        }
    }
}

/// Single or multi selection over string option values
#[derive(Debug)]
pub enum SelectionModel {
    Single(SingleSelection),
    Multi(MultiSelection),
}

impl SelectionModel {
    pub fn read(&self) -> SelectionState {
        match self {
            SelectionModel::Single(s) => SelectionState::Single(s.read()),
            SelectionModel::Multi(m) => SelectionState::Multi(m.read()),
        }
    }

    pub fn commit_option(&mut self, option: &SelectOption) -> CommitOutcome {
        match self {
            SelectionModel::Single(s) => s.commit_option(option),
            SelectionModel::Multi(m) => m.commit_option(option),
        }
    }

    /// Commit a free value (no availability check)
    pub fn commit_value(&mut self, value: String) -> CommitOutcome {
        match self {
            SelectionModel::Single(s) => s.commit(value),
            SelectionModel::Multi(m) => m.commit(value),
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        match self {
            SelectionModel::Single(s) => s.read().as_deref() == Some(value),
            SelectionModel::Multi(m) => m.read().contains(value),
        }
    }

    /// Single selection closes its overlay on commit; multi stays open
    pub fn closes_on_commit(&self) -> bool {
        matches!(self, SelectionModel::Single(_))
    }
}

impl From<SingleSelection> for SelectionModel {
    fn from(s: SingleSelection) -> Self {
        SelectionModel::Single(s)
    }
}

impl From<MultiSelection> for SelectionModel {
    fn from(m: MultiSelection) -> Self {
        SelectionModel::Multi(m)
    }
}
