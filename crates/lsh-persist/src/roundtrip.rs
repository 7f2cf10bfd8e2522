// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `save_index`/`load_index`: the two logical records and the load
//! procedure.
//!
//! Hyperplane families are never serialized — they are reconstructed from
//! `IndexConfig`'s stored seeds, then every metadata record is replayed
//! through `LshIndex::insert` in storage order. On-disk codes serve only as
//! a redundant integrity signal: if they disagree with the freshly
//! recomputed ones, the reconstructed index is still correct because
//! re-inserted vectors re-hash consistently.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use lsh_fragment::EmbeddingVector;
use lsh_index::{IndexConfig, LshIndex};

use crate::error::PersistError;
use crate::records::{BucketRecord, BucketStoreRecord, MetadataRecord, TableRecord, BUCKET_STORE_VERSION};
use crate::KvStore;

const BUCKET_STORE_KEY: &str = "bucket-store";
const METADATA_KEY: &str = "lsh-metadata";

/// Serializes `index` into the two logical records and saves them to
/// `store`.
///
/// # Errors
///
/// Returns [`PersistError`] on serialization or underlying store failure.
pub fn save_index(index: &LshIndex, store: &dyn KvStore) -> Result<(), PersistError> {
    let cfg = index.config();
    let mut table_buckets: Vec<FxHashMap<u64, Vec<lsh_fragment::Fragment>>> =
        (0..cfg.num_tables).map(|_| FxHashMap::default()).collect();
    let mut metadata_records = Vec::with_capacity(index.len());

    for id in index.fragment_ids() {
        let Some(record) = index.get(&id) else { continue };
        let mut codes: Vec<(usize, String)> = Vec::with_capacity(record.codes.len());
        for (&table_idx, &code) in &record.codes {
            codes.push((table_idx, code.value().to_string()));
            table_buckets[table_idx]
                .entry(code.value())
                .or_default()
                .push(record.fragment.clone());
        }
        metadata_records.push(MetadataRecord {
            id: id.clone(),
            fragment: record.fragment.clone(),
            embedding: record.embedding.as_slice().to_vec(),
            codes,
        });
    }

    let tables = table_buckets
        .into_iter()
        .enumerate()
        .map(|(index, buckets)| TableRecord {
            index,
            buckets: buckets
                .into_iter()
                .map(|(code, fragments)| BucketRecord {
                    code: code.to_string(),
                    fragments,
                })
                .collect(),
        })
        .collect();

    let bucket_record = BucketStoreRecord {
        version: BUCKET_STORE_VERSION,
        num_tables: cfg.num_tables,
        max_bucket_size: cfg.max_bucket_size,
        tables,
    };

    store.save(BUCKET_STORE_KEY, &serde_json::to_vec(&bucket_record)?)?;
    store.save(METADATA_KEY, &serde_json::to_vec(&metadata_records)?)?;
    debug!(fragments = metadata_records.len(), "index persisted");
    Ok(())
}

/// Reconstructs an [`LshIndex`] from `store` using `config`: builds
/// hyperplane families from `config`'s seeds, then replays every metadata
/// record's `(fragment, embedding)` pair through `insert`, in storage
/// order.
///
/// # Errors
///
/// Returns [`PersistError::InvalidState`] if the `bucket-store` record's
/// version or table count does not match `config`, or if the
/// `lsh-metadata` record is missing or fails to deserialize; propagates
/// [`PersistError`] from the underlying store or from reconstructing the
/// index.
pub fn load_index(config: IndexConfig, store: &dyn KvStore) -> Result<LshIndex, PersistError> {
    if let Some(bucket_bytes) = store.load(BUCKET_STORE_KEY)? {
        let bucket_record: BucketStoreRecord = serde_json::from_slice(&bucket_bytes)?;
        if bucket_record.version != BUCKET_STORE_VERSION {
            return Err(PersistError::InvalidState(format!(
                "bucket-store version {} is not supported (expected {BUCKET_STORE_VERSION})",
                bucket_record.version
            )));
        }
        if bucket_record.num_tables != config.num_tables {
            return Err(PersistError::InvalidState(format!(
                "bucket-store was written with {} tables, config expects {}",
                bucket_record.num_tables, config.num_tables
            )));
        }
    } else {
        warn!("bucket-store record missing on load; reconstructing from metadata alone");
    }

    let metadata_bytes = store
        .load(METADATA_KEY)?
        .ok_or_else(|| PersistError::InvalidState("lsh-metadata record is missing".to_string()))?;
    let metadata_records: Vec<MetadataRecord> = serde_json::from_slice(&metadata_bytes)?;

    let dimension = config.dimension;
    let mut index = LshIndex::new(config)
        .map_err(|e| PersistError::InvalidState(format!("cannot reconstruct index: {e}")))?;

    for record in metadata_records {
        if record.embedding.len() != dimension {
            return Err(PersistError::InvalidState(format!(
                "fragment {} has embedding dimension {}, expected {dimension}",
                record.id, record.embedding.len()
            )));
        }
        let embedding = EmbeddingVector::new(record.embedding);
        index
            .insert(record.fragment, embedding)
            .map_err(|e| PersistError::InvalidState(format!("replay failed for fragment {}: {e}", record.id)))?;
    }

    debug!(fragments = index.len(), "index reconstructed from persisted state");
    Ok(index)
}
