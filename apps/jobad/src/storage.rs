//! Whole-file persistence helpers shared by the skill stores and the document writer.
//!
//! Writes go to a temporary file in the target directory and are renamed over the
//! destination, so a crash leaves either the old file or the new one, never a mix.

use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::errors::AppError;

/// Reads a JSON document. A missing file yields `T::default()`; anything else that
/// prevents reading or parsing is `StorageUnavailable`.
pub fn load_json<T>(path: &Path) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(AppError::storage(path, e)),
    };
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&text).map_err(|e| AppError::storage(path, e))
}

/// Serializes `value` as pretty JSON with a trailing newline and replaces `path` atomically.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| AppError::storage(path, e))?;
    text.push('\n');
    write_atomic(path, text.as_bytes())
}

/// Replaces the file at `path` with `contents` via write-then-rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let map: BTreeMap<String, Vec<String>> = load_json(&dir.path().join("absent.json")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_blank_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        std::fs::write(&path, "\n").unwrap();
        let map: BTreeMap<String, Vec<String>> = load_json(&path).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_malformed_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_json::<BTreeMap<String, Vec<String>>>(&path).unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable { .. }));
    }

    #[test]
    fn test_save_creates_parent_dirs_and_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), vec!["b".to_string()]);
        save_json(&path, &map).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        // no temp files left behind
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }
}
