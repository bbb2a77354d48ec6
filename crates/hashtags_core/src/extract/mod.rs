//! Hashtag and mention extraction.
//!
//! # Responsibility
//! - Recognize `#tag` and `@mention` tokens in free text.
//! - Normalize tag tokens into their canonical index form.
//!
//! # Invariants
//! - `#` tokens are lower-cased; `@` tokens keep their case.
//! - Extraction is pure and never touches index state.

mod tokens;

pub use tokens::{
    extract_tags, extract_tags_from_bytes, is_tag_token, normalize_tag, HASHTAG_SIGIL,
    MENTION_SIGIL,
};
