//! Backing-file access with write-then-rename replacement.

use super::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Reads `path`, returning `None` when the file does not exist.
pub(super) fn read_if_exists(path: &Path) -> StorageResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_error(path, "read", err)),
    }
}

/// Replaces `path` with `bytes` without ever exposing a partial file.
///
/// The payload goes to a sibling temp file that is synced and then renamed
/// over the target; on any failure the temp file is removed and the
/// previous content stays in place.
pub(super) fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(|err| io_error(dir, "create directory", err))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> StorageResult<()> {
        let file = File::create(&tmp_path).map_err(|err| io_error(&tmp_path, "create", err))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(bytes)
            .map_err(|err| io_error(&tmp_path, "write", err))?;
        let file = writer
            .into_inner()
            .map_err(|err| io_error(&tmp_path, "flush", err.into_error()))?;
        file.sync_all()
            .map_err(|err| io_error(&tmp_path, "sync", err))?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error(path, "replace", err));
    }

    // Directory fsync is best-effort; not every platform allows opening one.
    if let Some(dir) = parent {
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

fn io_error(path: &Path, operation: &'static str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        operation,
        source,
    }
}
