//! Persistent hashtag/mention index.
//! Maps `#tag` and `@mention` tokens to the source IDs they appear in.

pub mod config;
pub mod extract;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use config::IndexOptions;
pub use extract::{extract_tags, extract_tags_from_bytes, normalize_tag};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::source_list::SourceList;
pub use model::tag_index::{CountItem, TagIndex};
pub use service::hash_list::HashList;
pub use storage::{DecodeError, EncodeError, StorageError, StorageFormat, StorageResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
