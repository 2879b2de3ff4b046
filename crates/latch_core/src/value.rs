//! Controlled and uncontrolled values
//!
//! Every stateful widget value (selection, open flag, date range) is either
//! owned by the widget or read from the host on demand. The choice is made
//! once, at construction, and never changes for the lifetime of the widget.
//!
//! ```rust
//! use latch_core::ValueSource;
//!
//! let mut owned = ValueSource::owned(1);
//! assert!(owned.write(2));
//! assert_eq!(owned.read(), 2);
//!
//! let mut external = ValueSource::external(|| 7);
//! assert!(!external.write(3));
//! assert_eq!(external.read(), 7);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

/// Host read function for controlled values
pub type ReadFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Change callback invoked with the proposed value on commit
pub type ChangeCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Where a widget value lives
pub enum ValueSource<T> {
    /// Uncontrolled: the widget stores the value
    Owned(T),
    /// Controlled: the host stores the value and the widget only reads it
    External(ReadFn<T>),
}

impl<T: Clone> ValueSource<T> {
    pub fn owned(value: T) -> Self {
        ValueSource::Owned(value)
    }

    pub fn external<F>(read: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        ValueSource::External(Arc::new(read))
    }

    /// Read from a shared cell owned by the host
    pub fn mirror(cell: &Arc<Mutex<T>>) -> Self
    where
        T: Send + 'static,
    {
        let cell = Arc::clone(cell);
        ValueSource::External(Arc::new(move || cell.lock().unwrap().clone()))
    }

    /// Current value
    pub fn read(&self) -> T {
        match self {
            ValueSource::Owned(value) => value.clone(),
            ValueSource::External(read) => read(),
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self, ValueSource::External(_))
    }

    /// Store a value
    ///
    /// Only owned values are written. Returns whether the value was stored.
    pub fn write(&mut self, value: T) -> bool {
        match self {
            ValueSource::Owned(slot) => {
                *slot = value;
                true
            }
            ValueSource::External(_) => false,
        }
    }

    /// Mutate an owned value in place
    ///
    /// Returns `None` for controlled values.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        match self {
            ValueSource::Owned(slot) => Some(f(slot)),
            ValueSource::External(_) => None,
        }
    }
}

impl<T: Default> Default for ValueSource<T> {
    fn default() -> Self {
        ValueSource::Owned(T::default())
    }
}

impl<T: Clone> Clone for ValueSource<T> {
    fn clone(&self) -> Self {
        match self {
            ValueSource::Owned(value) => ValueSource::Owned(value.clone()),
            ValueSource::External(read) => ValueSource::External(Arc::clone(read)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Owned(value) => f.debug_tuple("Owned").field(value).finish(),
            ValueSource::External(_) => f.write_str("External(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_follows_host() {
        let cell = Arc::new(Mutex::new(String::from("a")));
        let mut source = ValueSource::mirror(&cell);

        assert!(source.is_controlled());
        assert_eq!(source.read(), "a");

        assert!(!source.write("b".to_string()));
        assert_eq!(source.read(), "a");

        *cell.lock().unwrap() = "c".to_string();
        assert_eq!(source.read(), "c");
    }

    #[test]
    fn test_update_only_owned() {
        let mut owned = ValueSource::owned(vec![1]);
        assert_eq!(owned.update(|v| v.push(2)), Some(()));
        assert_eq!(owned.read(), vec![1, 2]);

        let mut external: ValueSource<Vec<i32>> = ValueSource::external(Vec::new);
        assert_eq!(external.update(|v| v.push(2)), None);
    }
}
