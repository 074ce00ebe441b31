//! List filtering by free text, category and type
//!
//! [`filter`] keeps a record when all three hold:
//!
//! 1. the category selection is `all` or equals the record's category
//! 2. the type selection is `all` or equals the record's type
//! 3. the search term is empty, or is a case-insensitive substring of the
//!    title, the description, or any tag
//!
//! Input order is preserved. Optional fields a record lacks simply do not
//! match; they never cause an error.

use std::fmt;

/// Fields a record exposes to the filter. Every accessor is optional.
pub trait Filterable {
    fn title(&self) -> Option<&str> {
        None
    }

    fn description(&self) -> Option<&str> {
        None
    }

    fn tags(&self) -> Option<&[String]> {
        None
    }

    fn category(&self) -> Option<&str> {
        None
    }

    /// The record's type (`article`, `video`, `nap`, ...)
    fn kind(&self) -> Option<&str> {
        None
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn title(&self) -> Option<&str> {
        (**self).title()
    }

    fn description(&self) -> Option<&str> {
        (**self).description()
    }

    fn tags(&self) -> Option<&[String]> {
        (**self).tags()
    }

    fn category(&self) -> Option<&str> {
        (**self).category()
    }

    fn kind(&self) -> Option<&str> {
        (**self).kind()
    }
}

/// A dropdown value: `all` or one concrete id
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub const ALL: &'static str = "all";

    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => Self::ALL,
            Selection::Only(id) => id,
        }
    }
}

impl From<&str> for Selection {
    fn from(id: &str) -> Self {
        if id == Self::ALL {
            Selection::All
        } else {
            Selection::Only(id.to_string())
        }
    }
}

impl From<String> for Selection {
    fn from(id: String) -> Self {
        Selection::from(id.as_str())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active search/filter state of a list view. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub category: Selection,
    pub kind: Selection,
}

impl FilterCriteria {
    /// Matches everything
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn category(mut self, category: impl Into<Selection>) -> Self {
        self.category = category.into();
        self
    }

    pub fn kind(mut self, kind: impl Into<Selection>) -> Self {
        self.kind = kind.into();
        self
    }

    /// True when a category or type dropdown is narrowed (search excluded)
    pub fn filters_applied(&self) -> bool {
        !self.category.is_all() || !self.kind.is_all()
    }

    pub fn matches<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        self.category.admits(record.category())
            && self.kind.admits(record.kind())
            && self.matches_search(record)
    }

    fn matches_search<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&needle);

        record.title().is_some_and(hit)
            || record.description().is_some_and(hit)
            || record
                .tags()
                .is_some_and(|tags| tags.iter().any(|tag| hit(tag.as_str())))
    }
}

/// Records that pass `criteria`, in input order.
pub fn filter<T: Filterable + Clone>(records: &[T], criteria: &FilterCriteria) -> Vec<T> {
    records
        .iter()
        .filter(|record| criteria.matches(*record))
        .cloned()
        .collect()
}

/// Borrowing variant of [`filter`]
pub fn filter_refs<'a, T: Filterable>(
    records: &'a [T],
    criteria: &'a FilterCriteria,
) -> impl Iterator<Item = &'a T> + 'a {
    records
        .iter()
        .filter(move |record| criteria.matches(*record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        title: &'static str,
        tags: Option<Vec<String>>,
        category: &'static str,
    }

    impl Filterable for Item {
        fn title(&self) -> Option<&str> {
            Some(self.title)
        }

        fn tags(&self) -> Option<&[String]> {
            self.tags.as_deref()
        }

        fn category(&self) -> Option<&str> {
            Some(self.category)
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                title: "Night routine",
                tags: Some(vec!["Sleep".to_string()]),
                category: "sleep",
            },
            Item {
                title: "First foods",
                tags: None,
                category: "feeding",
            },
        ]
    }

    #[test]
    fn test_selection_from_str() {
        assert_eq!(Selection::from("all"), Selection::All);
        assert_eq!(Selection::from("sleep"), Selection::Only("sleep".to_string()));
        assert_eq!(Selection::from("sleep").to_string(), "sleep");
    }

    #[test]
    fn test_tag_match_is_case_insensitive() {
        let found = filter(&items(), &FilterCriteria::new().search("SLEEP"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Night routine");
    }

    #[test]
    fn test_missing_kind_fails_type_filter() {
        // Item exposes no type, so any concrete type selection rejects it
        let found = filter(&items(), &FilterCriteria::new().kind("video"));
        assert!(found.is_empty());
    }

    #[test]
    fn test_filters_applied_ignores_search() {
        assert!(!FilterCriteria::new().search("x").filters_applied());
        assert!(FilterCriteria::new().category("health").filters_applied());
    }

    #[test]
    fn test_filter_refs_borrows() {
        let all = items();
        let criteria = FilterCriteria::new().category("feeding");
        let titles: Vec<&str> = filter_refs(&all, &criteria).map(|i| i.title).collect();
        assert_eq!(titles, vec!["First foods"]);
    }
}
