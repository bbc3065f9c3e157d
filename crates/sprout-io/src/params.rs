//! JSON records and output naming

use crate::IoResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Write a value as pretty-printed JSON.
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> IoResult<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path.as_ref(), text)?;
    log::debug!("wrote {}", path.as_ref().display());
    Ok(())
}

/// Read a JSON file into a value.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> IoResult<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Current local time as `YYYYmmdd_HHMM`.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M").to_string()
}

/// File name `{stem}_{timestamp}.{ext}`.
pub fn timestamped_name(stem: &str, ext: &str) -> String {
    format!("{stem}_{}.{ext}", timestamp())
}

/// Create `dir` (and parents) if needed and return it as a `PathBuf`.
pub fn ensure_dir(dir: impl AsRef<Path>) -> IoResult<PathBuf> {
    fs::create_dir_all(dir.as_ref())?;
    Ok(dir.as_ref().to_path_buf())
}
