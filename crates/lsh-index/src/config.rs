// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host configuration table recognized by the index.

use lsh_hash::ProbeConfig;
use lsh_store::BucketPolicy;

/// LRU eviction policy (`lruEviction.*` in host config).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LruEvictionConfig {
    /// Whether to evict when the threshold is reached.
    pub enabled: bool,
    /// Fragment count that triggers an eviction sweep.
    pub threshold: usize,
    /// Fraction of fragments to evict per sweep, in `(0.0, 1.0]`.
    pub fraction: f32,
}

impl Default for LruEvictionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 100_000,
            fraction: 0.1,
        }
    }
}

/// Hyperplane construction mode, re-exported at this layer so callers
/// configuring an index don't need to depend on `lsh-hash` directly.
pub use lsh_hash::HyperplaneMode;

/// The full host configuration table for one [`crate::LshIndex`].
/// Deserializable so it can be loaded from a JSON config file the way
/// `echo-app-core::config::ConfigService` loads any other value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndexConfig {
    /// Number of independent hash tables (`L`), typically 10-30.
    pub num_tables: usize,
    /// Hash width (`K`), typically 8-16, hard-capped at 64.
    pub num_bits: u32,
    /// Embedding dimension (`d`); must equal the embedder's.
    pub dimension: usize,
    /// Root seed for family construction (`seed_t = seed0 + t * 1000`).
    pub seed: u64,
    /// Use Gram-Schmidt orthogonalized hyperplanes instead of IID Gaussian.
    pub use_orthogonal_hyperplanes: bool,
    /// Master switch for multi-probe query expansion.
    pub multi_probe_enabled: bool,
    /// Probe budget per table at query time.
    pub num_probes: usize,
    /// Use perturbation-scored probe ordering.
    pub use_scored_probes: bool,
    /// Primary bucket capacity (`B_max`).
    pub max_bucket_size: usize,
    /// Whether overflow chaining is enabled.
    pub overflow_chaining_enabled: bool,
    /// Max overflow links per bucket (`C_max`).
    pub max_chain_length: usize,
    /// LRU eviction policy.
    pub lru_eviction: LruEvictionConfig,
    /// Whether per-bucket collision analytics are maintained.
    pub analytics_enabled: bool,
    /// Default minimum similarity threshold for queries.
    pub default_min_similarity: f32,
    /// Default maximum result count for queries.
    pub default_max_results: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            num_tables: 20,
            num_bits: 12,
            dimension: 256,
            seed: 42,
            use_orthogonal_hyperplanes: false,
            multi_probe_enabled: true,
            num_probes: 8,
            use_scored_probes: true,
            max_bucket_size: 32,
            overflow_chaining_enabled: true,
            max_chain_length: 4,
            lru_eviction: LruEvictionConfig::default(),
            analytics_enabled: false,
            default_min_similarity: 0.7,
            default_max_results: 50,
        }
    }
}

impl IndexConfig {
    /// The per-table seed for table `t`: `seed + t * 1000`.
    pub fn table_seed(&self, table_idx: usize) -> u64 {
        self.seed.wrapping_add((table_idx as u64).wrapping_mul(1000))
    }

    pub(crate) fn bucket_policy(&self) -> BucketPolicy {
        BucketPolicy {
            max_bucket_size: self.max_bucket_size,
            overflow_chaining_enabled: self.overflow_chaining_enabled,
            max_chain_length: self.max_chain_length,
        }
    }

    pub(crate) fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            enabled: self.multi_probe_enabled,
            num_probes: self.num_probes,
            scored: self.use_scored_probes,
        }
    }

    pub(crate) fn hyperplane_mode(&self) -> HyperplaneMode {
        if self.use_orthogonal_hyperplanes {
            HyperplaneMode::Orthogonalized
        } else {
            HyperplaneMode::IidGaussian
        }
    }
}
