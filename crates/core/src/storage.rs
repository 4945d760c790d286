//! Byte-level file helpers.
//!
//! Callers need "file not found" kept apart from every other read error:
//! a missing file means "create new", anything else aborts the operation.

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppResult;

/// Read a file, returning `Ok(None)` when it does not exist.
pub fn read_optional(path: &Path) -> AppResult<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read and parse a YAML file, returning `Ok(None)` when it does not exist.
pub fn read_yaml_optional<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    match read_optional(path)? {
        Some(bytes) => Ok(Some(serde_yaml::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Serialize `value` as YAML and write it to `path`, creating parent
/// directories when needed.
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let contents = serde_yaml::to_string(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, contents)?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let result = read_optional(&dir.path().join("nope.yml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_directory_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_optional(dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/value.yml");

        let mut value = BTreeMap::new();
        value.insert("key".to_string(), "value".to_string());
        write_yaml(&path, &value).unwrap();

        let loaded: BTreeMap<String, String> = read_yaml_optional(&path).unwrap().unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_read_yaml_parse_failure_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "key: [unclosed").unwrap();

        let result: AppResult<Option<BTreeMap<String, String>>> = read_yaml_optional(&path);
        assert!(result.is_err());
    }
}
