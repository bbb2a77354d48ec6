//! Tag index configuration.
//!
//! # Responsibility
//! - Describe where an index persists and which encoding it uses.
//! - Deserialize from a host application's own config file section.
//!
//! # Invariants
//! - `path: None` means "in-memory only": loads yield an empty index and
//!   stores fail with `StorageError::NoBackingPath`.

use crate::storage::StorageFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Construction options for [`crate::HashList`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Backing file; `None` keeps the index in memory.
    pub path: Option<PathBuf>,
    /// Encoding used by both load and store.
    pub format: StorageFormat,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backing file. An empty path clears it.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = normalize_path(path.into());
        self
    }

    pub fn with_format(mut self, format: StorageFormat) -> Self {
        self.format = format;
        self
    }
}

pub(crate) fn normalize_path(path: PathBuf) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::IndexOptions;
    use crate::storage::StorageFormat;
    use std::path::PathBuf;

    #[test]
    fn builder_treats_empty_path_as_unset() {
        let options = IndexOptions::new().with_path("");
        assert_eq!(options.path, None);

        let options = IndexOptions::new()
            .with_path("/tmp/tags.db")
            .with_format(StorageFormat::Binary);
        assert_eq!(options.path, Some(PathBuf::from("/tmp/tags.db")));
        assert_eq!(options.format, StorageFormat::Binary);
    }
}
