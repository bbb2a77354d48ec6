//! Line-oriented text encoding.
//!
//! ```text
//! [#sometag]
//! sourceIdA
//! sourceIdB
//! [@someMention]
//! sourceIdC
//! ```

use super::{DecodeError, EncodeError, StorageFormat};
use crate::extract::is_tag_token;
use crate::model::source_list::{is_valid_id, SourceList};
use crate::model::tag_index::TagIndex;

/// Validates that every entry survives a decode, then renders it.
pub(super) fn encode(index: &TagIndex) -> Result<String, EncodeError> {
    for (tag, sources) in index.sorted_entries() {
        if !is_tag_token(tag) {
            return Err(EncodeError::new(
                StorageFormat::Text,
                format!("tag `{}` is not a single token", tag.escape_debug()),
            ));
        }
        if let Some(id) = sources.iter().find(|id| !is_line_safe(id)) {
            return Err(EncodeError::new(
                StorageFormat::Text,
                format!(
                    "source id `{}` under `{tag}` cannot be stored as a text line",
                    id.escape_debug()
                ),
            ));
        }
    }
    Ok(render(index))
}

/// Renders without validation; used for checksums and display.
pub(super) fn render(index: &TagIndex) -> String {
    let mut out = String::new();
    for (tag, sources) in index.sorted_entries() {
        out.push('[');
        out.push_str(tag);
        out.push_str("]\n");
        for id in sources.iter() {
            out.push_str(id);
            out.push('\n');
        }
    }
    out
}

pub(super) fn decode(bytes: &[u8]) -> Result<TagIndex, DecodeError> {
    let content = std::str::from_utf8(bytes).map_err(|err| {
        let line = bytes[..err.valid_up_to()]
            .iter()
            .filter(|byte| **byte == b'\n')
            .count()
            + 1;
        DecodeError::new(StorageFormat::Text, line, "content is not valid UTF-8")
    })?;

    let mut index = TagIndex::new();
    let mut current: Option<(String, SourceList)> = None;
    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            if !is_tag_token(header) {
                return Err(DecodeError::new(
                    StorageFormat::Text,
                    line_no,
                    format!("invalid tag header `{line}`"),
                ));
            }
            if let Some((tag, sources)) = current.take() {
                merge(&mut index, tag, sources);
            }
            current = Some((header.to_string(), SourceList::new()));
            continue;
        }

        match current.as_mut() {
            Some((_, sources)) => {
                sources.insert(line);
            }
            None => {
                return Err(DecodeError::new(
                    StorageFormat::Text,
                    line_no,
                    "source id before any tag header",
                ));
            }
        }
    }

    if let Some((tag, sources)) = current.take() {
        merge(&mut index, tag, sources);
    }
    Ok(index)
}

// A bracketed line reads back as a header.
fn is_line_safe(id: &str) -> bool {
    is_valid_id(id) && !(id.starts_with('[') && id.ends_with(']'))
}

// A tag may legally appear in more than one block.
fn merge(index: &mut TagIndex, tag: String, sources: SourceList) {
    if sources.is_empty() {
        return;
    }
    match index.get(&tag) {
        Some(existing) => {
            let merged: SourceList = existing
                .iter()
                .chain(sources.iter())
                .map(str::to_string)
                .collect();
            index.put(tag, merged);
        }
        None => index.put(tag, sources),
    }
}
