//! Length-prefixed binary encoding.
//!
//! Each tag is one record:
//! - u32 tag length (little-endian), tag bytes
//! - u32 source count
//! - per source: u32 length, source bytes

use super::{DecodeError, EncodeError, StorageFormat};
use crate::extract::is_tag_token;
use crate::model::source_list::SourceList;
use crate::model::tag_index::TagIndex;

pub(super) fn encode(index: &TagIndex) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    for (tag, sources) in index.sorted_entries() {
        put_bytes(&mut out, tag.as_bytes(), "tag")?;
        put_u32(&mut out, sources.len(), "source count")?;
        for id in sources.iter() {
            put_bytes(&mut out, id.as_bytes(), "source id")?;
        }
    }
    Ok(out)
}

pub(super) fn decode(bytes: &[u8]) -> Result<TagIndex, DecodeError> {
    let mut reader = Reader { bytes, offset: 0 };
    let mut index = TagIndex::new();
    while !reader.is_at_end() {
        let tag_offset = reader.offset;
        let tag = reader.read_string("tag")?;
        if !is_tag_token(&tag) {
            return Err(DecodeError::new(
                StorageFormat::Binary,
                tag_offset,
                format!("invalid tag `{tag}`"),
            ));
        }

        let count = reader.read_u32("source count")?;
        let mut sources: Vec<String> = Vec::new();
        for _ in 0..count {
            sources.push(reader.read_string("source id")?);
        }

        let mut merged: SourceList = sources.into_iter().collect();
        if let Some(existing) = index.get(&tag) {
            merged = existing
                .iter()
                .chain(merged.iter())
                .map(str::to_string)
                .collect();
        }
        index.put(tag, merged);
    }
    Ok(index)
}

fn put_u32(out: &mut Vec<u8>, value: usize, what: &str) -> Result<(), EncodeError> {
    let value = u32::try_from(value).map_err(|_| {
        EncodeError::new(
            StorageFormat::Binary,
            format!("{what} length {value} exceeds the u32 prefix"),
        )
    })?;
    out.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

fn put_bytes(out: &mut Vec<u8>, value: &[u8], what: &str) -> Result<(), EncodeError> {
    put_u32(out, value.len(), what)?;
    out.extend_from_slice(value);
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&[u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                DecodeError::new(
                    StorageFormat::Binary,
                    self.offset,
                    format!(
                        "truncated {what}: need {len} bytes, {} left",
                        self.bytes.len() - self.offset
                    ),
                )
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self, what: &str) -> Result<u32, DecodeError> {
        let raw = self.take(4, what)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_string(&mut self, what: &str) -> Result<String, DecodeError> {
        let len = self.read_u32(what)? as usize;
        let start = self.offset;
        let raw = self.take(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| {
            DecodeError::new(
                StorageFormat::Binary,
                start,
                format!("{what} is not valid UTF-8"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, put_u32};
    use crate::model::tag_index::TagIndex;

    #[test]
    fn encode_writes_length_prefixed_records() {
        let mut index = TagIndex::new();
        index.insert("#a", "x");
        assert_eq!(
            encode(&index).unwrap(),
            vec![2, 0, 0, 0, b'#', b'a', 1, 0, 0, 0, 1, 0, 0, 0, b'x']
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_length_is_an_error_not_a_clamped_prefix() {
        let mut out = Vec::new();
        let err = put_u32(&mut out, u32::MAX as usize + 1, "source id").unwrap_err();
        assert!(err.message.contains("source id"));
        assert!(out.is_empty());

        put_u32(&mut out, u32::MAX as usize, "source id").unwrap();
        assert_eq!(out, [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn decode_rejects_truncated_record() {
        let err = decode(&[2, 0, 0, 0, b'#', b'a', 1, 0, 0, 0, 5, 0, 0, 0, b'x']).unwrap_err();
        assert_eq!(err.position, 14);
    }

    #[test]
    fn decode_rejects_tag_without_sigil() {
        let err = decode(&[1, 0, 0, 0, b'a', 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err.position, 0);
    }

    #[test]
    fn decode_drops_zero_count_records() {
        let index = decode(&[2, 0, 0, 0, b'#', b'a', 0, 0, 0, 0]).unwrap();
        assert!(index.is_empty());
    }
}
