use crate::error::TrendError;
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Return the current Unix epoch in seconds.
pub fn now_epoch_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short form used in report and audit lines.
pub fn short_hash(text: &str) -> String {
    content_hash(text).chars().take(12).collect()
}

/// Reads a text file, treating a missing file as empty.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context(format!("failed to read {}", path.display()))),
    }
}

fn write_failure(path: &Path, source: std::io::Error) -> TrendError {
    TrendError::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `contents` to a sibling temp file and renames it over `path`, so
/// readers see either the old or the new file and never a partial one.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), TrendError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|err| write_failure(path, err))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|err| write_failure(path, err))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|err| write_failure(path, err))?;
    tmp.as_file()
        .sync_all()
        .map_err(|err| write_failure(path, err))?;
    tmp.persist(path).map_err(|err| write_failure(path, err.error))?;
    Ok(())
}
