//! Tag index persistence.
//!
//! # Responsibility
//! - Encode/decode a `TagIndex` as line-oriented text or compact binary.
//! - Read and atomically replace the backing file.
//!
//! # Invariants
//! - Files carry no format marker; readers must use the writer's format.
//! - A missing file loads as an empty index.
//! - A failed store never damages the previous file on disk.
//! - Content that would not decode back is refused before anything is
//!   written.
//! - Encoded output lists tags in sorted order, so equal indexes encode to
//!   equal bytes.
//! - Only successful loads/stores are logged here; failures are returned and
//!   logged by the caller.

mod binary;
mod file;
mod text;

use crate::model::tag_index::TagIndex;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

pub type StorageResult<T> = Result<T, StorageError>;

/// On-disk encoding of the tag index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageFormat {
    /// `[tag]` header lines followed by one source ID per line.
    #[default]
    Text,
    /// Little-endian `u32` length-prefixed records.
    Binary,
}

impl StorageFormat {
    /// Stable string id used in configuration and log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

impl Display for StorageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageFormat {
    type Err = UnknownStorageFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "binary" | "bin" => Ok(Self::Binary),
            other => Err(UnknownStorageFormat(other.to_string())),
        }
    }
}

/// Rejected storage format name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStorageFormat(pub String);

impl Display for UnknownStorageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported storage format `{}`; expected text|binary",
            self.0
        )
    }
}

impl Error for UnknownStorageFormat {}

/// Malformed encoded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub format: StorageFormat,
    /// 1-based line for text, byte offset for binary.
    pub position: usize,
    pub message: String,
}

impl DecodeError {
    pub(crate) fn new(format: StorageFormat, position: usize, message: impl Into<String>) -> Self {
        Self {
            format,
            position,
            message: message.into(),
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let unit = match self.format {
            StorageFormat::Text => "line",
            StorageFormat::Binary => "offset",
        };
        write!(
            f,
            "malformed {} index at {unit} {}: {}",
            self.format, self.position, self.message
        )
    }
}

impl Error for DecodeError {}

/// In-memory content that the chosen format cannot represent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
    pub format: StorageFormat,
    pub message: String,
}

impl EncodeError {
    pub(crate) fn new(format: StorageFormat, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
        }
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot encode {} index: {}", self.format, self.message)
    }
}

impl Error for EncodeError {}

/// Persistence error surfaced by load/store.
#[derive(Debug)]
pub enum StorageError {
    /// Store was requested without a configured backing file.
    NoBackingPath,
    /// The backing file exists but cannot be decoded.
    Decode { path: PathBuf, detail: DecodeError },
    /// The index holds entries the target format cannot round-trip.
    Encode { path: PathBuf, detail: EncodeError },
    /// Filesystem failure while reading or writing.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
    },
}

impl StorageError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoBackingPath => "no_backing_path",
            Self::Decode { .. } => "decode_failed",
            Self::Encode { .. } => "encode_failed",
            Self::Io { .. } => "io_failed",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBackingPath => write!(f, "no backing file configured for tag index"),
            Self::Decode { path, detail } => write!(f, "{}: {detail}", path.display()),
            Self::Encode { path, detail } => write!(f, "{}: {detail}", path.display()),
            Self::Io {
                path,
                operation,
                source,
            } => write!(f, "failed to {operation} `{}`: {source}", path.display()),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoBackingPath => None,
            Self::Decode { detail, .. } => Some(detail),
            Self::Encode { detail, .. } => Some(detail),
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Encodes `index` in `format`.
///
/// Fails when an entry would not decode back unchanged, such as a text
/// source ID spanning lines or shaped like a `[tag]` header.
pub fn encode(index: &TagIndex, format: StorageFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        StorageFormat::Text => text::encode(index).map(String::into_bytes),
        StorageFormat::Binary => binary::encode(index),
    }
}

/// Decodes bytes previously produced by [`encode`] with the same `format`.
pub fn decode(bytes: &[u8], format: StorageFormat) -> Result<TagIndex, DecodeError> {
    match format {
        StorageFormat::Text => text::decode(bytes),
        StorageFormat::Binary => binary::decode(bytes),
    }
}

/// Canonical text rendering, also the checksum input.
pub fn to_text(index: &TagIndex) -> String {
    text::render(index)
}

/// Loads an index from `path`.
///
/// A missing file yields an empty index. The result is built from scratch,
/// so callers that swap it in only on success never observe partial state.
pub fn load(path: &Path, format: StorageFormat) -> StorageResult<TagIndex> {
    let started_at = Instant::now();
    let Some(bytes) = file::read_if_exists(path)? else {
        info!(
            "event=index_load module=storage status=ok format={} source=missing_file tags=0",
            format
        );
        return Ok(TagIndex::new());
    };

    let index = decode(&bytes, format).map_err(|detail| StorageError::Decode {
        path: path.to_path_buf(),
        detail,
    })?;

    info!(
        "event=index_load module=storage status=ok format={} tags={} bytes={} duration_ms={}",
        format,
        index.len(),
        bytes.len(),
        started_at.elapsed().as_millis()
    );
    Ok(index)
}

/// Atomically writes `index` to `path` and returns the byte count.
///
/// An [`EncodeError`] is reported before the file is touched.
pub fn store(path: &Path, index: &TagIndex, format: StorageFormat) -> StorageResult<usize> {
    if path.as_os_str().is_empty() {
        return Err(StorageError::NoBackingPath);
    }

    let started_at = Instant::now();
    let bytes = encode(index, format).map_err(|detail| StorageError::Encode {
        path: path.to_path_buf(),
        detail,
    })?;
    file::write_atomic(path, &bytes)?;

    info!(
        "event=index_store module=storage status=ok format={} tags={} bytes={} duration_ms={}",
        format,
        index.len(),
        bytes.len(),
        started_at.elapsed().as_millis()
    );
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, StorageFormat};
    use crate::model::tag_index::TagIndex;

    fn sample() -> TagIndex {
        let mut index = TagIndex::new();
        index.insert("#hash1", "id_c");
        index.insert("#hash1", "id_a");
        index.insert("@Mention", "id_b");
        index
    }

    #[test]
    fn storage_format_parses_known_names() {
        assert_eq!("Binary".parse::<StorageFormat>(), Ok(StorageFormat::Binary));
        assert_eq!(" text ".parse::<StorageFormat>(), Ok(StorageFormat::Text));
        assert!("json".parse::<StorageFormat>().is_err());
    }

    #[test]
    fn both_formats_decode_what_they_encode() {
        for format in [StorageFormat::Text, StorageFormat::Binary] {
            let index = sample();
            let bytes = encode(&index, format).expect("encode should succeed");
            let decoded = decode(&bytes, format).expect("decode should succeed");
            assert_eq!(decoded, index, "format {format}");
        }
    }

    #[test]
    fn formats_are_not_interchangeable() {
        let bytes = encode(&sample(), StorageFormat::Binary).unwrap();
        assert!(decode(&bytes, StorageFormat::Text).is_err());
    }

    #[test]
    fn bracketed_ids_fit_binary_but_not_text() {
        let mut index = sample();
        index.insert("#todo", "[draft]");
        assert!(encode(&index, StorageFormat::Text).is_err());

        let bytes = encode(&index, StorageFormat::Binary).unwrap();
        assert_eq!(decode(&bytes, StorageFormat::Binary).unwrap(), index);
    }
}
