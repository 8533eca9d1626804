//! Title-based reconciliation between source items and destination snapshots.
//!
//! Source and destination ids live in different namespaces, so the only
//! matching key is the title, compared exactly after trimming.

use std::collections::HashMap;

/// Matching key of a title: exact text with surrounding whitespace removed.
#[must_use]
pub fn title_key(title: &str) -> &str {
    title.trim()
}

/// Destination items fetched at the start of a phase, keyed by trimmed title.
///
/// Items created during the phase are added so that a source collection
/// containing the same title twice yields a single destination item.
#[derive(Debug, Clone)]
pub struct TitleIndex<T = ()> {
    items: HashMap<String, T>,
}

impl<T> Default for TitleIndex<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
        }
    }
}

impl TitleIndex<()> {
    /// Builds an index from a snapshot of titles.
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(titles.into_iter().map(|title| (title, ())))
    }
}

impl<T> TitleIndex<T> {
    /// Builds an index from a destination snapshot. The first item wins on duplicate titles.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for (title, item) in items {
            index
                .items
                .entry(title_key(title.as_ref()).to_string())
                .or_insert(item);
        }
        index
    }

    /// Returns true if a destination item with this title exists.
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.items.contains_key(title_key(title))
    }

    /// Returns the destination item with this title.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&T> {
        self.items.get(title_key(title))
    }

    /// Records a newly created item.
    pub fn insert(&mut self, title: &str, item: T) {
        self.items.insert(title_key(title).to_string(), item);
    }

    /// Number of distinct titles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
