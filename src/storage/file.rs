//! Directory-backed key-value store.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file
//! first and are renamed into place so a crash never leaves a half-written
//! value behind.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use super::error::StoreError;
use super::Store;

/// Key-value store persisted as one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CreateDir` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;
        debug!("Store opened at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let write_err = |source| StoreError::Write {
            key: key.to_string(),
            source,
        };

        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }
}
