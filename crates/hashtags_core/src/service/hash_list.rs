//! Concurrent hashtag/mention index.
//!
//! # Responsibility
//! - Own the shared `TagIndex` and serialize access through one RW lock.
//! - Track structural changes to keep the content checksum cached.
//! - Bridge the index to its configured backing file.
//!
//! # Invariants
//! - Queries take the shared lock; mutations take the exclusive lock.
//! - The change counter advances, inside the exclusive lock, exactly when a
//!   mutation altered the index (`clear` and `load` always advance it).
//! - A cached checksum is reused only while the counter still equals the
//!   value it was computed against.
//! - A failed `load` leaves the current index untouched.

use crate::config::{normalize_path, IndexOptions};
use crate::extract::{extract_tags, normalize_tag};
use crate::model::source_list::is_valid_id;
use crate::model::tag_index::{CountItem, TagIndex};
use crate::storage::{self, StorageError, StorageFormat, StorageResult};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy)]
struct ChecksumCache {
    computed_at: u64,
    value: u32,
}

/// Thread-safe inverted index from tags to source IDs.
///
/// Mutating methods return `&Self` so calls can be chained:
///
/// ```
/// use hashtags_core::HashList;
///
/// let list = HashList::in_memory();
/// list.hash_add("#rust", "post-1").hash_add("@ferris", "post-1");
/// assert_eq!(list.id_list("post-1"), vec!["#rust", "@ferris"]);
/// ```
#[derive(Debug)]
pub struct HashList {
    index: RwLock<TagIndex>,
    change: AtomicU64,
    checksum: Mutex<Option<ChecksumCache>>,
    options: IndexOptions,
}

impl Default for HashList {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl HashList {
    /// Creates an empty index without a backing file.
    pub fn in_memory() -> Self {
        Self::with_options(IndexOptions::default())
    }

    /// Creates an index from `options`, loading the backing file if present.
    ///
    /// # Errors
    /// - Returns `StorageError::Decode` when the file exists but is malformed.
    /// - Returns `StorageError::Io` when the file exists but cannot be read.
    pub fn new(options: IndexOptions) -> StorageResult<Self> {
        let list = Self::with_options(options);
        list.load()?;
        Ok(list)
    }

    /// Shorthand for [`HashList::new`] with a path and format.
    pub fn open(path: impl Into<PathBuf>, format: StorageFormat) -> StorageResult<Self> {
        Self::new(IndexOptions::new().with_path(path).with_format(format))
    }

    fn with_options(options: IndexOptions) -> Self {
        Self {
            index: RwLock::new(TagIndex::new()),
            change: AtomicU64::new(0),
            checksum: Mutex::new(None),
            options,
        }
    }

    /// Backing file, if configured.
    pub fn path(&self) -> Option<&Path> {
        self.options.path.as_deref()
    }

    /// Changes the backing file; an empty path detaches the index from disk.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.options.path = normalize_path(path.into());
        self
    }

    pub fn format(&self) -> StorageFormat {
        self.options.format
    }

    pub fn set_format(&mut self, format: StorageFormat) -> &mut Self {
        self.options.format = format;
        self
    }

    /// Current value of the structural change counter.
    pub fn change_count(&self) -> u64 {
        self.change.load(Ordering::Acquire)
    }

    /// Links `id` to `tag`, creating the tag when needed.
    ///
    /// Malformed tags, blank IDs and IDs with line breaks are ignored.
    pub fn hash_add(&self, tag: &str, id: &str) -> &Self {
        let Some(tag) = normalize_tag(tag) else {
            return self;
        };
        if !is_valid_id(id) {
            return self;
        }
        self.mutate(|index| index.insert(&tag, id))
    }

    /// Unlinks `id` from `tag`; the tag disappears with its last source.
    pub fn hash_remove(&self, tag: &str, id: &str) -> &Self {
        let Some(tag) = normalize_tag(tag) else {
            return self;
        };
        self.mutate(|index| index.remove(&tag, id))
    }

    /// Number of sources linked to `tag`.
    pub fn hash_len(&self, tag: &str) -> usize {
        normalize_tag(tag)
            .and_then(|tag| self.index.read().get(&tag).map(|list| list.len()))
            .unwrap_or(0)
    }

    /// Sources linked to `tag`, ascending; empty when the tag is unknown.
    pub fn hash_list(&self, tag: &str) -> Vec<String> {
        normalize_tag(tag)
            .and_then(|tag| {
                self.index
                    .read()
                    .get(&tag)
                    .map(|list| list.as_slice().to_vec())
            })
            .unwrap_or_default()
    }

    /// All tags with their source counts, largest count first.
    pub fn counted_list(&self) -> Vec<CountItem> {
        self.index.read().counted_entries()
    }

    /// Tags linked to `id`, ascending.
    pub fn id_list(&self, id: &str) -> Vec<String> {
        self.index.read().tags_for(id)
    }

    /// Unlinks `id` from every tag.
    pub fn id_remove(&self, id: &str) -> &Self {
        self.mutate(|index| index.remove_id(id))
    }

    /// Replaces `old_id` with `new_id` wherever it is linked.
    pub fn id_rename(&self, old_id: &str, new_id: &str) -> &Self {
        if !is_valid_id(new_id) {
            return self;
        }
        self.mutate(|index| index.rename_id(old_id, new_id))
    }

    /// Re-derives the tags of `id` from `text`.
    ///
    /// The extracted set fully replaces the previous associations of `id`:
    /// tags no longer mentioned are unlinked, new ones are linked.
    pub fn id_update(&self, id: &str, text: &str) -> &Self {
        if !is_valid_id(id) {
            return self;
        }
        let wanted = extract_tags(text);
        self.mutate(|index| {
            let mut changed = false;
            for stale in index.tags_for(id) {
                if !wanted.contains(&stale) {
                    changed |= index.remove(&stale, id);
                }
            }
            for tag in &wanted {
                changed |= index.insert(tag, id);
            }
            debug!(
                "event=id_update module=service status=ok changed={} tags={}",
                changed,
                wanted.len()
            );
            changed
        })
    }

    /// Byte-buffer variant of [`HashList::id_update`]; invalid UTF-8 is
    /// replaced before scanning.
    pub fn id_update_bytes(&self, id: &str, text: &[u8]) -> &Self {
        self.id_update(id, &String::from_utf8_lossy(text))
    }

    /// CRC-32 over the canonical text encoding.
    ///
    /// Depends only on content, not on insertion history. Recomputed only
    /// after the change counter moved.
    pub fn checksum(&self) -> u32 {
        let index = self.index.read();
        let current = self.change.load(Ordering::Acquire);
        let mut cache = self.checksum.lock();
        if let Some(cached) = *cache {
            if cached.computed_at == current {
                return cached.value;
            }
        }

        let value = crc32fast::hash(storage::to_text(&index).as_bytes());
        *cache = Some(ChecksumCache {
            computed_at: current,
            value,
        });
        value
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Total number of tag/source associations.
    pub fn len_total(&self) -> usize {
        self.index.read().len_total()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Removes every tag and association.
    pub fn clear(&self) -> &Self {
        self.mutate(|index| {
            index.clear();
            true
        })
    }

    /// Replaces the index content with the backing file's.
    ///
    /// Without a backing path this is a no-op. A missing file loads as an
    /// empty index; a malformed one is reported and the current content is
    /// kept.
    pub fn load(&self) -> StorageResult<&Self> {
        let Some(path) = self.options.path.as_deref() else {
            return Ok(self);
        };

        let mut index = self.index.write();
        match storage::load(path, self.options.format) {
            Ok(loaded) => {
                *index = loaded;
                self.change.fetch_add(1, Ordering::AcqRel);
                Ok(self)
            }
            Err(err) => {
                warn!(
                    "event=hash_list_load module=service status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Writes the index to the backing file and returns the byte count.
    ///
    /// # Errors
    /// - `StorageError::NoBackingPath` when no path is configured.
    /// - `StorageError::Encode` when an entry cannot round-trip in the
    ///   configured format; nothing is written.
    /// - `StorageError::Io` when writing fails; the old file stays intact.
    pub fn store(&self) -> StorageResult<usize> {
        let Some(path) = self.options.path.as_deref() else {
            return Err(StorageError::NoBackingPath);
        };

        let index = self.index.read();
        storage::store(path, &index, self.options.format).inspect_err(|err| {
            warn!(
                "event=hash_list_store module=service status=error error_code={} error={}",
                err.code(),
                err
            );
        })
    }

    fn mutate(&self, apply: impl FnOnce(&mut TagIndex) -> bool) -> &Self {
        let mut index = self.index.write();
        if apply(&mut *index) {
            self.change.fetch_add(1, Ordering::AcqRel);
        }
        self
    }
}

impl Display for HashList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&storage::to_text(&self.index.read()))
    }
}

#[cfg(test)]
mod tests {
    use super::HashList;

    fn cached_at(list: &HashList) -> Option<u64> {
        list.checksum.lock().as_ref().map(|cache| cache.computed_at)
    }

    #[test]
    fn checksum_is_cached_until_the_index_changes() {
        let list = HashList::in_memory();
        list.hash_add("#hash1", "id_a").hash_add("#hash2", "id_c");
        assert_eq!(cached_at(&list), None);

        let first = list.checksum();
        assert_eq!(cached_at(&list), Some(list.change_count()));

        list.hash_add("#hash1", "id_a");
        assert_eq!(cached_at(&list), Some(list.change_count()));
        assert_eq!(list.checksum(), first);

        list.hash_add("#hash3", "id_b");
        assert_ne!(cached_at(&list), Some(list.change_count()));
        assert_ne!(list.checksum(), first);
        assert_eq!(cached_at(&list), Some(list.change_count()));
    }

    #[test]
    fn checksum_ignores_insertion_history() {
        let left = HashList::in_memory();
        left.hash_add("#hash1", "id_a")
            .hash_add("#hash2", "id_c")
            .hash_add("#hash2", "id_b");
        let right = HashList::in_memory();
        right
            .hash_add("#hash2", "id_b")
            .hash_add("#hash9", "id_x")
            .hash_add("#hash2", "id_c")
            .hash_add("#hash1", "id_a")
            .hash_remove("#hash9", "id_x");

        assert_ne!(left.change_count(), right.change_count());
        assert_eq!(left.checksum(), right.checksum());
    }
}
