//! Token scanner for hashtags and mentions.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Leading character of hashtag tokens.
pub const HASHTAG_SIGIL: char = '#';
/// Leading character of mention tokens.
pub const MENTION_SIGIL: char = '@';

// Word runs may be joined by `_`, `-` or apostrophes, but a token never ends
// on a connector, so `_#tag_` yields `#tag`.
const TAG_TOKEN: &str = r"[#@][\p{L}\p{N}\p{M}]+(?:[_'’\-]+[\p{L}\p{N}\p{M}]+)*";

static TAG_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(TAG_TOKEN).expect("valid tag token regex"));

static WHOLE_TAG_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{TAG_TOKEN}$")).expect("valid whole tag token regex"));

/// Characters that never open a token when they sit right before a sigil.
/// `&` keeps HTML entities such as `&#39;` out.
const BLOCKING_MARKS: &[char] = &[HASHTAG_SIGIL, MENTION_SIGIL, '&'];

/// Extracts the deduplicated set of canonical tag tokens in `text`.
///
/// A sigil only starts a token at the beginning of the text or after a
/// separator. Letters, digits, `&` and other sigils in front of it
/// disqualify the candidate, which keeps words like `page#3`, HTML entities
/// (`&#39;`) and e-mail addresses out of the index.
pub fn extract_tags(text: &str) -> BTreeSet<String> {
    TAG_TOKEN_RE
        .find_iter(text)
        .filter(|found| has_token_boundary(text, found.start()))
        .filter_map(|found| normalize_tag(found.as_str()))
        .collect()
}

/// Byte-oriented variant of [`extract_tags`]; invalid UTF-8 is replaced.
pub fn extract_tags_from_bytes(bytes: &[u8]) -> BTreeSet<String> {
    extract_tags(&String::from_utf8_lossy(bytes))
}

/// Normalizes one caller-supplied tag into its canonical token.
///
/// Returns `None` for blank input, a bare sigil, or anything that is not a
/// single well-formed token (inner whitespace, control characters, brackets).
/// Input without a sigil is treated as a hashtag.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    let candidate = match trimmed.chars().next()? {
        MENTION_SIGIL => trimmed.to_string(),
        HASHTAG_SIGIL => trimmed.to_lowercase(),
        _ => format!("{HASHTAG_SIGIL}{}", trimmed.to_lowercase()),
    };
    is_tag_token(&candidate).then_some(candidate)
}

/// Returns whether `value` is exactly one tag token: a sigil followed by a
/// body the extractor would accept.
pub fn is_tag_token(value: &str) -> bool {
    WHOLE_TAG_TOKEN_RE.is_match(value)
}

fn has_token_boundary(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(previous) => !previous.is_alphanumeric() && !BLOCKING_MARKS.contains(&previous),
    }
}
