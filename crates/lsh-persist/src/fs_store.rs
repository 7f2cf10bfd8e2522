// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed key/value store: one file per key.
//!
//! Adapted from `echo-config-fs::FsConfigStore`, generalized to take an
//! explicit base directory instead of resolving a platform-specific
//! per-application config path — this store backs a library-level index,
//! not a user-facing tool's own settings.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{error::PersistError, KvStore};

/// Stores each key as a JSON-named file under `base`: `{base}/{key}.json`.
pub struct FsKvStore {
    base: PathBuf,
}

impl FsKvStore {
    /// Opens (creating if necessary) a store rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if `base` cannot be created.
    pub fn new(base: impl AsRef<Path>) -> Result<Self, PersistError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl KvStore for FsKvStore {
    fn save(&self, key: &str, data: &[u8]) -> Result<(), PersistError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PersistError::Io(err)),
        }
    }

    fn delete(&self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistError::Io(err)),
        }
    }

    fn list(&self) -> Result<Vec<String>, PersistError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(std::ffi::OsStr::to_str) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(std::ffi::OsStr::to_str) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}
