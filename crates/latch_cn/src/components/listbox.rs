//! Listbox - the searchable option list shared by Combobox, Select, MultiSelect and CommandPalette
//!
//! Owns the option list, the search text, the filtered rows and the keyboard
//! focus over those rows. Keeps them consistent: every change to the search
//! text re-filters and clears focus before returning.

use serde::Serialize;

use latch_core::{
    filter_options, FilterError, KeyboardNavigator, OptionFilter, OptionIndex, SelectOption,
};

/// One visible row
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionRowView {
    pub value: String,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
    pub focused: bool,
}

/// Options, search text, filtered rows and focus
#[derive(Debug)]
pub struct Listbox {
    options: Vec<SelectOption>,
    index: OptionIndex,
    filter: OptionFilter,
    search: String,
    /// Indices into `options`, in display order
    visible: Vec<usize>,
    nav: KeyboardNavigator,
}

impl Listbox {
    pub fn new(options: Vec<SelectOption>, filter: OptionFilter) -> Self {
        let visible: Vec<usize> = (0..options.len()).collect();
        let nav = KeyboardNavigator::new(visible.len());
        Self {
            index: OptionIndex::new(&options),
            options,
            filter,
            search: String::new(),
            visible,
            nav,
        }
    }

    /// Enable Home/End on the navigator
    pub fn with_home_end(mut self) -> Self {
        self.nav = self.nav.with_home_end();
        self
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Label of the first option with `value`
    pub fn label_of(&self, value: &str) -> Option<&str> {
        self.index.label(&self.options, value)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Visible option indices
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn nav(&self) -> &KeyboardNavigator {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut KeyboardNavigator {
        &mut self.nav
    }

    /// Replace the search text
    ///
    /// On a filter error nothing changes and the error is returned. Returns
    /// `Ok(false)` when the text is unchanged.
    pub fn set_search(&mut self, text: &str) -> Result<bool, FilterError> {
        if text == self.search {
            return Ok(false);
        }
        let visible = filter_options(&self.options, text, &self.filter)?;
        self.search = text.to_string();
        self.visible = visible;
        self.nav.reset(self.visible.len());
        Ok(true)
    }

    /// Empty the search text and show every option
    pub fn clear_search(&mut self) {
        self.search.clear();
        self.visible = (0..self.options.len()).collect();
        self.nav.reset(self.visible.len());
    }

    /// Replace the options, keeping the search text
    pub fn set_options(&mut self, options: Vec<SelectOption>) -> Result<(), FilterError> {
        let visible = filter_options(&options, &self.search, &self.filter)?;
        self.index = OptionIndex::new(&options);
        self.options = options;
        self.visible = visible;
        self.nav.reset(self.visible.len());
        Ok(())
    }

    /// Clear focus without touching the rows
    pub fn reset_focus(&mut self) {
        self.nav.reset(self.visible.len());
    }

    /// Option shown at `row`
    pub fn option_at(&self, row: usize) -> Option<&SelectOption> {
        self.visible.get(row).and_then(|&i| self.options.get(i))
    }

    pub fn focused_row(&self) -> Option<usize> {
        self.nav.focused()
    }

    pub fn focused_option(&self) -> Option<&SelectOption> {
        self.focused_row().and_then(|row| self.option_at(row))
    }

    /// Pointer hover focuses a row
    pub fn hover(&mut self, row: usize) -> bool {
        self.nav.focus(row)
    }

    /// Row view models
    ///
    /// `selected` marks rows as selected; `blocked` marks enabled rows that
    /// must still render disabled (a full multi selection).
    pub fn rows(
        &self,
        selected: impl Fn(&SelectOption) -> bool,
        blocked: impl Fn(&SelectOption) -> bool,
    ) -> Vec<OptionRowView> {
        let focused = self.focused_row();
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(row, &i)| self.options.get(i).map(|opt| (row, opt)))
            .map(|(row, opt)| OptionRowView {
                value: opt.value.clone(),
                label: opt.label.clone(),
                disabled: opt.is_disabled() || blocked(opt),
                selected: selected(opt),
                focused: focused == Some(row),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listbox() -> Listbox {
        Listbox::new(
            vec![
                SelectOption::new("apple", "Apple"),
                SelectOption::new("banana", "Banana").disabled(),
                SelectOption::new("cherry", "Cherry"),
            ],
            OptionFilter::Label,
        )
    }

    #[test]
    fn test_search_resets_focus() {
        let mut lb = listbox();
        lb.nav_mut().move_next();
        lb.nav_mut().move_next();
        assert_eq!(lb.focused_row(), Some(1));

        assert_eq!(lb.set_search("e"), Ok(true));
        assert_eq!(lb.focused_row(), None);
        assert_eq!(lb.visible(), &[0, 2]);

        assert_eq!(lb.set_search("e"), Ok(false));
    }

    #[test]
    fn test_filter_error_keeps_state() {
        let mut lb = Listbox::new(
            vec![SelectOption::new("a", "A"), SelectOption::new("b", "B")],
            OptionFilter::custom(|_, q| {
                if q == "boom" {
                    Err(FilterError::predicate(q, "exploded"))
                } else {
                    Ok(true)
                }
            }),
        );
        lb.set_search("x").unwrap();
        lb.hover(1);

        assert!(lb.set_search("boom").is_err());
        assert_eq!(lb.search(), "x");
        assert_eq!(lb.visible(), &[0, 1]);
        assert_eq!(lb.focused_row(), Some(1));
    }

    #[test]
    fn test_rows_mark_focus_and_selection() {
        let mut lb = listbox();
        lb.hover(2);
        let rows = lb.rows(|o| o.value == "apple", |_| false);

        assert_eq!(rows.len(), 3);
        assert!(rows[0].selected);
        assert!(rows[1].disabled);
        assert!(rows[2].focused);
        assert_eq!(lb.focused_option().map(|o| o.value.as_str()), Some("cherry"));
    }

    #[test]
    fn test_label_lookup_survives_option_swap() {
        let mut lb = listbox();
        assert_eq!(lb.label_of("banana"), Some("Banana"));

        lb.set_options(vec![
            SelectOption::new("kiwi", "Kiwi"),
            SelectOption::new("kiwi", "Second Kiwi"),
        ])
        .unwrap();
        assert_eq!(lb.label_of("banana"), None);
        assert_eq!(lb.label_of("kiwi"), Some("Kiwi"));
    }

    #[test]
    fn test_clear_search_shows_all() {
        let mut lb = listbox();
        lb.set_search("zz").unwrap();
        assert!(lb.visible().is_empty());
        lb.clear_search();
        assert_eq!(lb.visible().len(), 3);
        assert_eq!(lb.search(), "");
    }
}
