//! Option filtering
//!
//! Filtering maps `(options, search)` to the indices of the options that stay
//! visible, in their original order. An empty search shows everything.

use std::fmt;
use std::sync::Arc;

use crate::error::FilterError;
use crate::option::SelectOption;

/// Custom filter predicate
///
/// Receives the option and the raw (not lowercased) search text.
pub type FilterFn = Arc<dyn Fn(&SelectOption, &str) -> Result<bool, FilterError> + Send + Sync>;

/// Which options match a search
#[derive(Clone, Default)]
pub enum OptionFilter {
    /// Case-insensitive substring match on the label
    #[default]
    Label,
    /// Case-insensitive substring match on value, label or any keyword
    LabelOrKeywords,
    /// Host predicate, fully replacing the built-in match
    Custom(FilterFn),
}

impl OptionFilter {
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&SelectOption, &str) -> Result<bool, FilterError> + Send + Sync + 'static,
    {
        OptionFilter::Custom(Arc::new(predicate))
    }

    /// Wrap a predicate that cannot fail
    pub fn infallible<F>(predicate: F) -> Self
    where
        F: Fn(&SelectOption, &str) -> bool + Send + Sync + 'static,
    {
        OptionFilter::Custom(Arc::new(move |opt: &SelectOption, query: &str| {
            Ok(predicate(opt, query))
        }))
    }

    /// Test one option
    ///
    /// `needle` is the lowercased query, used by the built-in variants.
    fn matches(&self, option: &SelectOption, query: &str, needle: &str) -> Result<bool, FilterError> {
        match self {
            OptionFilter::Label => Ok(option.label.to_lowercase().contains(needle)),
            OptionFilter::LabelOrKeywords => Ok(option.value.to_lowercase().contains(needle)
                || option.label.to_lowercase().contains(needle)
                || option
                    .keywords
                    .iter()
                    .any(|k| k.to_lowercase().contains(needle))),
            OptionFilter::Custom(predicate) => predicate(option, query),
        }
    }
}

impl fmt::Debug for OptionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionFilter::Label => f.write_str("Label"),
            OptionFilter::LabelOrKeywords => f.write_str("LabelOrKeywords"),
            OptionFilter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Filter options by search text
///
/// Returns indices into `options`. The first predicate error aborts the whole
/// pass; callers keep their previous filtered list in that case.
pub fn filter_options(
    options: &[SelectOption],
    query: &str,
    filter: &OptionFilter,
) -> Result<Vec<usize>, FilterError> {
    if query.is_empty() {
        return Ok((0..options.len()).collect());
    }

    let needle = query.to_lowercase();
    let mut visible = Vec::with_capacity(options.len());
    for (i, option) in options.iter().enumerate() {
        if filter.matches(option, query, &needle)? {
            visible.push(i);
        }
    }
    Ok(visible)
}

/// Free-text value admitted when nothing is focused
pub fn custom_candidate(query: &str, allow_custom: bool) -> Option<&str> {
    (allow_custom && !query.is_empty()).then_some(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> Vec<SelectOption> {
        vec![
            SelectOption::new("apple", "Apple"),
            SelectOption::new("banana", "Banana"),
            SelectOption::new("cherry", "Cherry"),
        ]
    }

    #[test]
    fn test_empty_query_is_identity() {
        let options = fruits();
        assert_eq!(
            filter_options(&options, "", &OptionFilter::Label).unwrap(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_case_insensitive_label() {
        let options = fruits();
        assert_eq!(
            filter_options(&options, "AN", &OptionFilter::Label).unwrap(),
            vec![1]
        );
        assert_eq!(
            filter_options(&options, "e", &OptionFilter::Label).unwrap(),
            vec![0, 2]
        );
        assert!(filter_options(&options, "zz", &OptionFilter::Label)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_keywords() {
        let options = vec![
            SelectOption::new("new-file", "New File").keywords(["create", "touch"]),
            SelectOption::new("open", "Open"),
        ];
        assert_eq!(
            filter_options(&options, "Create", &OptionFilter::LabelOrKeywords).unwrap(),
            vec![0]
        );
        assert!(filter_options(&options, "create", &OptionFilter::Label)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_custom_replaces_default() {
        let options = fruits();
        let starts_with = OptionFilter::infallible(|opt, q| opt.value.starts_with(q));

        assert_eq!(filter_options(&options, "ch", &starts_with).unwrap(), vec![2]);
        // Default would match "Apple" for "pl", the custom predicate does not
        assert!(filter_options(&options, "pl", &starts_with)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_custom_error_propagates() {
        let options = fruits();
        let failing = OptionFilter::custom(|_, q| Err(FilterError::predicate(q, "backend offline")));

        let err = filter_options(&options, "a", &failing).unwrap_err();
        assert_eq!(err, FilterError::predicate("a", "backend offline"));
        // Empty search never consults the predicate
        assert!(filter_options(&options, "", &failing).is_ok());
    }

    #[test]
    fn test_custom_candidate() {
        assert_eq!(custom_candidate("kiwi", true), Some("kiwi"));
        assert_eq!(custom_candidate("kiwi", false), None);
        assert_eq!(custom_candidate("", true), None);
    }
}
