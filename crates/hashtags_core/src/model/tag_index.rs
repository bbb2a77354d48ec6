//! Tag-token to source-list mapping.
//!
//! # Responsibility
//! - Map each tag token to the sorted list of sources referencing it.
//! - Answer per-tag, per-source and aggregate count queries.
//!
//! # Invariants
//! - No tag maps to an empty list; emptied tags are dropped immediately.
//! - The index itself performs no tag normalization; callers pass
//!   canonical tokens (see `extract::normalize_tag`).

use crate::model::source_list::SourceList;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the counted tag listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountItem {
    /// Number of sources referencing `tag`.
    pub count: usize,
    /// Canonical tag token.
    pub tag: String,
}

/// In-memory inverted index from tag token to sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: HashMap<String, SourceList>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sources under `tag`, if any.
    pub fn get(&self, tag: &str) -> Option<&SourceList> {
        self.tags.get(tag)
    }

    /// Replaces the list stored under `tag`.
    ///
    /// An empty `list` removes the tag instead of storing it.
    pub fn put(&mut self, tag: impl Into<String>, list: SourceList) {
        let tag = tag.into();
        if list.is_empty() {
            self.tags.remove(&tag);
        } else {
            self.tags.insert(tag, list);
        }
    }

    /// Drops `tag` and all its associations.
    pub fn delete(&mut self, tag: &str) -> bool {
        self.tags.remove(tag).is_some()
    }

    /// Links `id` to `tag`, creating the tag when needed.
    pub fn insert(&mut self, tag: &str, id: &str) -> bool {
        match self.tags.get_mut(tag) {
            Some(list) => list.insert(id),
            None => {
                let mut list = SourceList::new();
                list.insert(id);
                self.tags.insert(tag.to_string(), list);
                true
            }
        }
    }

    /// Unlinks `id` from `tag`, dropping the tag when it empties.
    pub fn remove(&mut self, tag: &str, id: &str) -> bool {
        let Some(list) = self.tags.get_mut(tag) else {
            return false;
        };
        let changed = list.remove(id);
        if list.is_empty() {
            self.tags.remove(tag);
        }
        changed
    }

    /// Returns every tag referencing `id`, ascending.
    pub fn tags_for(&self, id: &str) -> Vec<String> {
        let mut tags: Vec<String> = self
            .tags
            .iter()
            .filter(|(_, list)| list.contains(id))
            .map(|(tag, _)| tag.clone())
            .collect();
        tags.sort();
        tags
    }

    /// Unlinks `id` from every tag.
    pub fn remove_id(&mut self, id: &str) -> bool {
        let mut changed = false;
        self.tags.retain(|_, list| {
            changed |= list.remove(id);
            !list.is_empty()
        });
        changed
    }

    /// Renames `old_id` to `new_id` under every tag referencing it.
    pub fn rename_id(&mut self, old_id: &str, new_id: &str) -> bool {
        let mut changed = false;
        for list in self.tags.values_mut() {
            changed |= list.rename(old_id, new_id);
        }
        changed
    }

    /// Returns all tags with their source counts, largest count first.
    ///
    /// Ties are ordered by tag so the listing is deterministic.
    pub fn counted_entries(&self) -> Vec<CountItem> {
        let mut items: Vec<CountItem> = self
            .tags
            .iter()
            .map(|(tag, list)| CountItem {
                count: list.len(),
                tag: tag.clone(),
            })
            .collect();
        items.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.tag.cmp(&right.tag))
        });
        items
    }

    /// Returns `(tag, sources)` pairs ordered by tag.
    pub fn sorted_entries(&self) -> Vec<(&str, &SourceList)> {
        let mut entries: Vec<(&str, &SourceList)> = self
            .tags
            .iter()
            .map(|(tag, list)| (tag.as_str(), list))
            .collect();
        entries.sort_by(|left, right| left.0.cmp(right.0));
        entries
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Sum of all per-tag source counts.
    pub fn len_total(&self) -> usize {
        self.tags.values().map(SourceList::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{CountItem, TagIndex};
    use crate::model::source_list::SourceList;

    fn sample() -> TagIndex {
        let mut index = TagIndex::new();
        index.insert("#hash1", "id_c");
        index.insert("#hash2", "id_a");
        index.insert("#hash2", "id_c");
        index.insert("#hash1", "id_a");
        index
    }

    #[test]
    fn insert_builds_sorted_lists_and_counts() {
        let index = sample();
        assert_eq!(index.len(), 2);
        assert_eq!(index.len_total(), 4);
        assert_eq!(
            index.get("#hash1").map(SourceList::as_slice),
            Some(&["id_a".to_string(), "id_c".to_string()][..])
        );
        assert!(!sample().insert("#hash1", "id_a"));
    }

    #[test]
    fn remove_drops_emptied_tags() {
        let mut index = sample();
        assert!(index.remove("#hash1", "id_a"));
        assert!(index.remove("#hash1", "id_c"));
        assert!(index.get("#hash1").is_none());
        assert!(!index.remove("#hash1", "id_c"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn put_with_empty_list_removes_tag() {
        let mut index = sample();
        index.put("#hash2", SourceList::new());
        assert!(index.get("#hash2").is_none());
        index.put("@mention", ["b", "a"].into_iter().collect());
        assert_eq!(index.tags_for("a"), vec!["#hash1".to_string(), "@mention".to_string()]);
    }

    #[test]
    fn remove_id_and_rename_id_touch_every_tag() {
        let mut index = sample();
        assert!(index.rename_id("id_c", "id_z"));
        assert_eq!(index.tags_for("id_c"), Vec::<String>::new());
        assert_eq!(index.tags_for("id_z").len(), 2);

        assert!(index.remove_id("id_a"));
        assert!(index.remove_id("id_z"));
        assert!(index.is_empty());
        assert!(!index.remove_id("id_z"));
    }

    #[test]
    fn counted_entries_sort_descending_by_count() {
        let mut index = TagIndex::new();
        index.insert("#hash1", "id_a");
        index.insert("@mention1", "id_c");
        index.insert("@mention1", "id_b");
        for id in ["id_a", "id_b", "id_c"] {
            index.insert("#another3", id);
        }

        let counts: Vec<usize> = index.counted_entries().iter().map(|item| item.count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
        assert_eq!(
            index.counted_entries()[0],
            CountItem {
                count: 3,
                tag: "#another3".to_string()
            }
        );
    }
}
