// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory key/value store backed by a plain map.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{error::PersistError, KvStore};

/// Stores blobs in a `HashMap<String, Vec<u8>>` behind a `RwLock`, suitable
/// for tests and short-lived processes that never persist across restarts.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn save(&self, key: &str, data: &[u8]) -> Result<(), PersistError> {
        let mut blobs = self.blobs.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let blobs = self.blobs.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), PersistError> {
        let mut blobs = self.blobs.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.remove(key);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, PersistError> {
        let blobs = self.blobs.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(blobs.keys().cloned().collect())
    }
}
