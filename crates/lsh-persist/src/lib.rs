// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Byte-backed key/value persistence for an [`lsh_index::LshIndex`].
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::similar_names
)]

mod error;
mod fs_store;
mod memory_store;
mod records;
mod roundtrip;

pub use error::PersistError;
pub use fs_store::FsKvStore;
pub use memory_store::MemoryKvStore;
pub use records::{BucketRecord, BucketStoreRecord, MetadataRecord, TableRecord};
pub use roundtrip::{load_index, save_index};

/// Storage port for raw index persistence blobs, keyed by logical name.
/// Implementations: [`MemoryKvStore`] (a map) or [`FsKvStore`] (one file per
/// key); any equivalent byte store can implement this trait.
pub trait KvStore {
    /// Persists `data` under `key`, overwriting any prior value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] on an underlying I/O failure.
    fn save(&self, key: &str, data: &[u8]) -> Result<(), PersistError>;

    /// Loads the bytes stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] on an underlying I/O failure.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;

    /// Deletes `key`, if present. A missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] on an underlying I/O failure.
    fn delete(&self, key: &str) -> Result<(), PersistError>;

    /// Lists every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] on an underlying I/O failure.
    fn list(&self) -> Result<Vec<String>, PersistError>;

    /// `true` if `key` is currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] on an underlying I/O failure.
    fn exists(&self, key: &str) -> Result<bool, PersistError> {
        Ok(self.load(key)?.is_some())
    }
}
