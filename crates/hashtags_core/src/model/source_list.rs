//! Ordered source-ID list.
//!
//! # Responsibility
//! - Hold the unique source IDs linked to one tag.
//! - Keep entries sorted on every write so reads never sort.
//!
//! # Invariants
//! - Entries are unique and in ascending byte order.
//! - Writes report whether membership actually changed.

use std::fmt::{Display, Formatter};

/// Returns whether `id` can be linked: not blank and free of line breaks.
pub fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains(['\n', '\r'])
}

/// Sorted, duplicate-free list of source IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    ids: Vec<String>,
}

impl SourceList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of `id`, or `None` when absent.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|current| current == id)
    }

    /// Returns whether `id` is a member.
    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .binary_search_by(|current| current.as_str().cmp(id))
            .is_ok()
    }

    /// Inserts `id` at its sorted position.
    ///
    /// Returns `false` when `id` was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        match self
            .ids
            .binary_search_by(|current| current.as_str().cmp(id.as_str()))
        {
            Ok(_) => false,
            Err(slot) => {
                self.ids.insert(slot, id);
                true
            }
        }
    }

    /// Removes `id` if present.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                self.ids.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Replaces `old_id` with `new_id`, keeping the list sorted.
    ///
    /// Returns `false` when `old_id` is absent or equal to `new_id`.
    /// When `new_id` is already a member the result is just the removal.
    pub fn rename(&mut self, old_id: &str, new_id: &str) -> bool {
        if old_id == new_id || !self.remove(old_id) {
            return false;
        }
        self.insert(new_id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    /// Consumes the list into its sorted IDs.
    pub fn into_vec(self) -> Vec<String> {
        self.ids
    }
}

impl Display for SourceList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.ids.join("\n"))
    }
}

impl<S: Into<String>> FromIterator<S> for SourceList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids: Vec<String> = iter.into_iter().map(Into::into).collect();
        ids.sort();
        ids.dedup();
        Self { ids }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_id, SourceList};

    fn list(ids: &[&str]) -> SourceList {
        ids.iter().copied().collect()
    }

    #[test]
    fn index_of_finds_sorted_positions() {
        let sources = list(&["one", "two", "three", "four", "five"]);
        assert_eq!(sources.index_of("five"), Some(0));
        assert_eq!(sources.index_of("four"), Some(1));
        assert_eq!(sources.index_of("two"), Some(4));
        assert_eq!(sources.index_of("six"), None);
    }

    #[test]
    fn insert_keeps_order_and_rejects_duplicates() {
        let mut sources = SourceList::new();
        assert!(sources.insert("id_c"));
        assert!(sources.insert("id_a"));
        assert!(sources.insert("id_b"));
        assert!(!sources.insert("id_a"));
        assert_eq!(sources.as_slice(), ["id_a", "id_b", "id_c"]);
    }

    #[test]
    fn remove_is_a_noop_for_missing_ids() {
        let mut sources = list(&["one", "two", "three", "four", "five"]);
        assert!(sources.remove("one"));
        assert!(sources.remove("five"));
        assert!(sources.remove("three"));
        assert!(!sources.remove("three"));
        assert_eq!(sources.as_slice(), ["four", "two"]);
    }

    #[test]
    fn rename_resorts_and_ignores_unknown_ids() {
        let mut sources = list(&["one", "two", "three"]);
        assert!(sources.rename("three", "four"));
        assert_eq!(sources.as_slice(), ["four", "one", "two"]);

        assert!(!sources.rename("three", "six"));
        assert_eq!(sources.as_slice(), ["four", "one", "two"]);

        assert!(sources.rename("four", "one"));
        assert_eq!(sources.as_slice(), ["one", "two"]);
    }

    #[test]
    fn ids_must_be_single_non_blank_lines() {
        assert!(is_valid_id("id_a"));
        assert!(is_valid_id("[draft]"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("  "));
        assert!(!is_valid_id("a\nb"));
        assert!(!is_valid_id("a\r"));
    }

    #[test]
    fn display_renders_one_id_per_line() {
        assert_eq!(list(&["one", "two", "three"]).to_string(), "one\nthree\ntwo");
        assert_eq!(SourceList::new().to_string(), "");
    }
}
