// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! On-disk record shapes.
//!
//! Codes are serialized as decimal strings because `K` may reach 64 bits,
//! outside JSON's safe integer range for some consumers. Embeddings are
//! serialized as plain `f32` arrays — `serde_json` round-trips IEEE-754
//! text losslessly for finite values, which is all this workspace produces.

use lsh_fragment::{Fragment, FragmentId};

/// Current on-disk version of [`BucketStoreRecord`].
pub const BUCKET_STORE_VERSION: u32 = 1;

/// One occupied bucket's serialized contents.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BucketRecord {
    /// The hash code this bucket is keyed by, as a decimal string.
    pub code: String,
    /// Fragments stored at this code. Overflow chains are flattened into
    /// this single list on write; they are reconstituted by re-insertion on
    /// load, not by restoring chain structure directly.
    pub fragments: Vec<Fragment>,
}

/// One table's serialized buckets.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TableRecord {
    /// Table index (`0..num_tables`).
    pub index: usize,
    /// Every occupied bucket in this table.
    pub buckets: Vec<BucketRecord>,
}

/// The full `bucket-store` record.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BucketStoreRecord {
    /// On-disk schema version; currently always [`BUCKET_STORE_VERSION`].
    pub version: u32,
    /// Number of tables (`L`) this record was written with.
    pub num_tables: usize,
    /// Primary bucket capacity (`B_max`) this record was written with.
    pub max_bucket_size: usize,
    /// Per-table bucket contents.
    pub tables: Vec<TableRecord>,
}

/// One fragment's serialized metadata entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetadataRecord {
    /// The fragment's identifier.
    pub id: FragmentId,
    /// The fragment payload.
    pub fragment: Fragment,
    /// The embedding this fragment was indexed with, as raw components.
    pub embedding: Vec<f32>,
    /// `(table_idx, code_as_decimal_string)` pairs for every table this
    /// fragment was stored in.
    pub codes: Vec<(usize, String)>,
}
