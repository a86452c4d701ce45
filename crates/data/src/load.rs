use crate::error::CacheError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `Ok(None)` when the file does not exist; every other failure is an error.
pub fn read_text_if_exists(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Decodes from raw bytes, so a file cut off mid-character is a parse error
/// rather than an io error.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(CacheError::io(path, err)),
    };
    Ok(Some(serde_json::from_slice(&raw)?))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CacheError> {
    let body = serde_json::to_string(value)?;
    fs::write(path, body).map_err(|err| CacheError::io(path, err))
}

/// Creating a directory that already exists is not an error.
pub fn ensure_dir(path: &Path) -> Result<(), CacheError> {
    fs::create_dir_all(path).map_err(|err| CacheError::io(path, err))
}

/// `collection.json` -> `collection.json.old`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".old");
    PathBuf::from(raw)
}
