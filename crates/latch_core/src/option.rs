//! Selectable options
//!
//! An option is identified by its `value`; the `label` is what users see and
//! what the default filter searches. Duplicate values are not rejected. Every
//! lookup resolves to the first option carrying the value.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Whether an option (or date) may be committed
///
/// Checked once, at the commit policy boundary. Navigation never looks at it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Enabled,
    Disabled,
}

impl Availability {
    pub fn from_disabled(disabled: bool) -> Self {
        if disabled {
            Availability::Disabled
        } else {
            Availability::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Availability::Enabled)
    }

    pub fn is_disabled(self) -> bool {
        matches!(self, Availability::Disabled)
    }
}

/// An option in a list, menu or palette
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// The value (reported through change callbacks when committed)
    pub value: String,
    /// The display label (used for the trigger text and filtering)
    pub label: String,
    #[serde(default)]
    pub availability: Availability,
    /// Extra search terms, matched by [`OptionFilter::LabelOrKeywords`](crate::filter::OptionFilter::LabelOrKeywords)
    #[serde(default)]
    pub keywords: SmallVec<[String; 2]>,
}

impl SelectOption {
    /// Create a new enabled option with value and label
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            availability: Availability::Enabled,
            keywords: SmallVec::new(),
        }
    }

    /// Mark this option as disabled
    pub fn disabled(mut self) -> Self {
        self.availability = Availability::Disabled;
        self
    }

    /// Set availability from a flag
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.availability = Availability::from_disabled(disabled);
        self
    }

    /// Add search keywords
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.availability.is_disabled()
    }
}

/// Find the first option with the given value
pub fn find_option<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a SelectOption> {
    options.iter().find(|opt| opt.value == value)
}

/// Value -> position lookup table for large option lists
///
/// Built once per option list. Duplicate values keep the first position, so
/// lookups agree with [`find_option`].
#[derive(Clone, Debug, Default)]
pub struct OptionIndex {
    by_value: FxHashMap<String, usize>,
}

impl OptionIndex {
    pub fn new(options: &[SelectOption]) -> Self {
        let mut by_value = FxHashMap::default();
        for (position, option) in options.iter().enumerate() {
            by_value.entry(option.value.clone()).or_insert(position);
        }
        Self { by_value }
    }

    /// Position of the first option carrying `value`
    pub fn position(&self, value: &str) -> Option<usize> {
        self.by_value.get(value).copied()
    }

    /// Label for `value`, if it names an option
    pub fn label<'a>(&self, options: &'a [SelectOption], value: &str) -> Option<&'a str> {
        self.position(value)
            .and_then(|p| options.get(p))
            .map(|opt| opt.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_creation() {
        let opt = SelectOption::new("us", "United States");
        assert_eq!(opt.value, "us");
        assert_eq!(opt.label, "United States");
        assert!(!opt.is_disabled());
        assert!(opt.clone().disabled().is_disabled());
    }

    #[test]
    fn test_duplicate_values_resolve_to_first() {
        let options = vec![
            SelectOption::new("dup", "First"),
            SelectOption::new("other", "Other"),
            SelectOption::new("dup", "Second"),
        ];

        assert_eq!(find_option(&options, "dup").unwrap().label, "First");

        let index = OptionIndex::new(&options);
        assert_eq!(index.position("dup"), Some(0));
        assert_eq!(index.label(&options, "dup"), Some("First"));
        assert_eq!(index.len(), 2);
        assert_eq!(index.position("missing"), None);
    }
}
