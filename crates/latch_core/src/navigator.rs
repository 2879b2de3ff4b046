//! Keyboard focus traversal
//!
//! [`KeyboardNavigator`] tracks which row of the *filtered* list has keyboard
//! focus. It knows only the list length; what a row means (and whether it is
//! disabled) is the widget's business.
//!
//! | Key | Effect |
//! |---|---|
//! | ArrowDown | next row, wrapping; from no focus to the first row |
//! | ArrowUp | previous row, wrapping; from no focus to the last row |
//! | Home / End | first / last row (when enabled) |
//! | Enter | [`NavigationOutcome::Commit`] with the focused row, if any |
//! | Escape | [`NavigationOutcome::Dismiss`] |
//!
//! Disabled rows are not skipped: focus can rest on them, and the commit
//! policy refuses them on Enter.

use crate::events::{Key, KeyEvent};

/// What a key press asks the widget to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Focus changed (or was re-asserted)
    Moved,
    /// Enter pressed; carries the focused row, if any
    Commit(Option<usize>),
    /// Escape pressed
    Dismiss,
    /// Not a navigation key
    Ignored,
}

/// Focus index over a list of `len` rows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardNavigator {
    focused: Option<usize>,
    len: usize,
    home_end: bool,
}

impl KeyboardNavigator {
    pub fn new(len: usize) -> Self {
        Self {
            focused: None,
            len,
            home_end: false,
        }
    }

    /// Enable Home/End jumps
    pub fn with_home_end(mut self) -> Self {
        self.home_end = true;
        self
    }

    /// Replace the list length and clear focus
    ///
    /// Called whenever the filtered list is recomputed or the overlay opens.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.focused = None;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Focus as a signed index, `-1` for none
    pub fn focus_index(&self) -> isize {
        self.focused.map_or(-1, |i| i as isize)
    }

    pub fn move_next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.focused = Some(match self.focused {
            Some(i) => (i + 1) % self.len,
            None => 0,
        });
        self.focused
    }

    pub fn move_prev(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.focused = Some(match self.focused {
            Some(0) | None => self.len - 1,
            Some(i) => i - 1,
        });
        self.focused
    }

    pub fn move_first(&mut self) -> Option<usize> {
        self.focused = (self.len > 0).then_some(0);
        self.focused
    }

    pub fn move_last(&mut self) -> Option<usize> {
        self.focused = self.len.checked_sub(1);
        self.focused
    }

    /// Focus a row directly (pointer hover)
    ///
    /// Out-of-range indices are ignored.
    pub fn focus(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.focused = Some(index);
        true
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Interpret a key
    pub fn handle_key(&mut self, event: &KeyEvent) -> NavigationOutcome {
        let outcome = match event.key {
            Key::ArrowDown => {
                self.move_next();
                NavigationOutcome::Moved
            }
            Key::ArrowUp => {
                self.move_prev();
                NavigationOutcome::Moved
            }
            Key::Home if self.home_end => {
                self.move_first();
                NavigationOutcome::Moved
            }
            Key::End if self.home_end => {
                self.move_last();
                NavigationOutcome::Moved
            }
            Key::Enter => NavigationOutcome::Commit(self.focused),
            Key::Escape => NavigationOutcome::Dismiss,
            _ => NavigationOutcome::Ignored,
        };
        tracing::trace!(key = ?event.key, focused = ?self.focused, ?outcome, "navigator key");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> KeyEvent {
        KeyEvent::named(name)
    }

    #[test]
    fn test_wrap_forward() {
        let mut nav = KeyboardNavigator::new(3);
        let seen: Vec<_> = (0..4).map(|_| nav.move_next()).collect();
        assert_eq!(seen, vec![Some(0), Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn test_wrap_backward() {
        let mut nav = KeyboardNavigator::new(3);
        assert_eq!(nav.move_prev(), Some(2));
        assert_eq!(nav.move_prev(), Some(1));
        assert_eq!(nav.move_prev(), Some(0));
        assert_eq!(nav.move_prev(), Some(2));
    }

    #[test]
    fn test_arrow_down_n_times_returns_to_start() {
        for n in 1..8 {
            let mut nav = KeyboardNavigator::new(n);
            nav.move_next();
            let start = nav.focused();
            for _ in 0..n {
                nav.handle_key(&key("ArrowDown"));
            }
            assert_eq!(nav.focused(), start, "n = {n}");
        }
    }

    #[test]
    fn test_empty_list_keeps_no_focus() {
        let mut nav = KeyboardNavigator::new(0).with_home_end();
        assert_eq!(nav.move_next(), None);
        assert_eq!(nav.move_prev(), None);
        assert_eq!(nav.move_first(), None);
        assert_eq!(nav.move_last(), None);
        assert_eq!(nav.focus_index(), -1);
        assert_eq!(nav.handle_key(&key("Enter")), NavigationOutcome::Commit(None));
    }

    #[test]
    fn test_home_end_opt_in() {
        let mut nav = KeyboardNavigator::new(4);
        assert_eq!(nav.handle_key(&key("End")), NavigationOutcome::Ignored);
        assert_eq!(nav.focused(), None);

        let mut nav = KeyboardNavigator::new(4).with_home_end();
        nav.handle_key(&key("End"));
        assert_eq!(nav.focused(), Some(3));
        nav.handle_key(&key("Home"));
        assert_eq!(nav.focused(), Some(0));
    }

    #[test]
    fn test_reset_and_hover() {
        let mut nav = KeyboardNavigator::new(5);
        assert!(nav.focus(3));
        assert!(!nav.focus(5));
        assert_eq!(nav.handle_key(&key("Enter")), NavigationOutcome::Commit(Some(3)));

        nav.reset(2);
        assert_eq!(nav.focused(), None);
        assert_eq!(nav.len(), 2);
        assert_eq!(nav.handle_key(&key("Escape")), NavigationOutcome::Dismiss);
        assert_eq!(nav.handle_key(&key("a")), NavigationOutcome::Ignored);
    }
}
