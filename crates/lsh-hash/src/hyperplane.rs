// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hyperplane family construction and vector hashing.

use lsh_fragment::EmbeddingVector;

use crate::code::HashCode;
use crate::prng::Prng;
use crate::MAX_BITS;

/// Construction mode for a hyperplane family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HyperplaneMode {
    /// Each hyperplane is an independently-sampled, normalized Gaussian
    /// vector. Correlations between hyperplanes are `~sqrt(1/dim)`.
    IidGaussian,
    /// IID Gaussian sampling followed by modified Gram-Schmidt
    /// orthogonalization against all prior vectors in the family, with
    /// resampling on numerical collapse.
    Orthogonalized,
}

/// Errors constructing a hyperplane family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HyperplaneError {
    /// `bits` exceeded [`MAX_BITS`].
    #[error("requested {bits} hash bits, maximum is {MAX_BITS}")]
    TooManyBits {
        /// The offending bit width.
        bits: u32,
    },
    /// `dim` was zero.
    #[error("hyperplane dimension must be nonzero")]
    ZeroDimension,
    /// A vector's dimension did not match the family's configured `dim`.
    #[error("vector has dimension {actual}, family expects {expected}")]
    DimensionMismatch {
        /// The family's configured dimension.
        expected: usize,
        /// The dimension of the rejected vector.
        actual: usize,
    },
}

/// Report on pairwise hyperplane correlation within a family.
///
/// Used only by tests and diagnostics, never by production query paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionQuality {
    /// Mean absolute pairwise inner product among the family's hyperplanes.
    pub mean_abs_inner_product: f32,
    /// Maximum absolute pairwise inner product.
    pub max_abs_inner_product: f32,
    /// `true` iff `max_abs_inner_product < 0.1`.
    pub orthogonal: bool,
}

const GRAM_SCHMIDT_COLLAPSE_THRESHOLD: f32 = 1e-10;
const GRAM_SCHMIDT_MAX_RESAMPLES: usize = 64;

/// An ordered family of K unit vectors ("hyperplanes") of dimension `dim`,
/// produced deterministically from a 64-bit seed.
///
/// Vectors are stored flattened in one contiguous row-major buffer
/// (array-of-structures at the family level, structure-of-arrays at the
/// hyperplane level) so [`HyperplaneFamily::hash`] walks one cache line per
/// hyperplane instead of chasing `K` separate heap allocations.
#[derive(Clone, Debug)]
pub struct HyperplaneFamily {
    bits: u32,
    dim: usize,
    seed: u64,
    mode: HyperplaneMode,
    rows: Vec<f32>,
}

impl HyperplaneFamily {
    /// Constructs a new family of `bits` hyperplanes in `dim` dimensions,
    /// deterministically from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`HyperplaneError::TooManyBits`] if `bits > MAX_BITS`, or
    /// [`HyperplaneError::ZeroDimension`] if `dim == 0`.
    pub fn new(bits: u32, dim: usize, seed: u64, mode: HyperplaneMode) -> Result<Self, HyperplaneError> {
        if bits > MAX_BITS {
            return Err(HyperplaneError::TooManyBits { bits });
        }
        if dim == 0 {
            return Err(HyperplaneError::ZeroDimension);
        }

        let mut prng = Prng::from_seed(seed);
        let rows = match mode {
            HyperplaneMode::IidGaussian => sample_iid(&mut prng, bits, dim),
            HyperplaneMode::Orthogonalized => sample_orthogonalized(&mut prng, bits, dim),
        };

        Ok(Self {
            bits,
            dim,
            seed,
            mode,
            rows,
        })
    }

    /// Number of hyperplanes (`K`).
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Expected input dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The seed this family was constructed from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Construction mode this family used.
    pub fn mode(&self) -> HyperplaneMode {
        self.mode
    }

    fn row(&self, i: u32) -> &[f32] {
        let start = i as usize * self.dim;
        &self.rows[start..start + self.dim]
    }

    /// Hashes a single vector to a K-bit code.
    ///
    /// Bit `i` is set iff `⟨v, h_i⟩ >= 0`; ties at exactly zero set the bit
    /// (documented boundary behavior — matters only for the all-zero input,
    /// which hashes to all-1 bits).
    ///
    /// # Errors
    ///
    /// Returns [`HyperplaneError::DimensionMismatch`] if `v.dim() != self.dim()`.
    pub fn hash(&self, v: &EmbeddingVector) -> Result<HashCode, HyperplaneError> {
        if v.dim() != self.dim {
            return Err(HyperplaneError::DimensionMismatch {
                expected: self.dim,
                actual: v.dim(),
            });
        }

        let mut code: u64 = 0;
        for i in 0..self.bits {
            let dot = lsh_fragment::dot_unrolled(v.as_slice(), self.row(i));
            if dot >= 0.0 {
                code |= 1u64 << i;
            }
        }
        Ok(HashCode(code))
    }

    /// Raw signed projection of `v` onto hyperplane `i`: `⟨v, h_i⟩`.
    ///
    /// Exposed for the scored multi-probe generator, which needs the per-bit
    /// magnitude `|⟨v, h_i⟩|` to rank which bits are least confident (and
    /// therefore most worth flipping first).
    ///
    /// # Errors
    ///
    /// Returns [`HyperplaneError::DimensionMismatch`] if `v.dim() != self.dim()`.
    pub fn hash_distance_component(&self, v: &EmbeddingVector, i: u32) -> Result<f32, HyperplaneError> {
        if v.dim() != self.dim {
            return Err(HyperplaneError::DimensionMismatch {
                expected: self.dim,
                actual: v.dim(),
            });
        }
        Ok(lsh_fragment::dot_unrolled(v.as_slice(), self.row(i)))
    }

    /// Hashes many vectors against this family.
    ///
    /// Semantically equal to calling [`HyperplaneFamily::hash`] once per
    /// vector; the signature exists so callers can batch without
    /// re-validating dimension per call, and so a future parallel
    /// implementation has a single seam to optimize.
    ///
    /// # Errors
    ///
    /// Returns [`HyperplaneError::DimensionMismatch`] on the first vector
    /// whose dimension does not match.
    pub fn batch_hash(&self, vs: &[EmbeddingVector]) -> Result<Vec<HashCode>, HyperplaneError> {
        vs.iter().map(|v| self.hash(v)).collect()
    }

    /// Computes the pairwise-correlation report for this family.
    pub fn projection_quality(&self) -> ProjectionQuality {
        let mut sum_abs = 0.0f64;
        let mut max_abs = 0.0f32;
        let mut pairs = 0usize;

        for i in 0..self.bits {
            for j in (i + 1)..self.bits {
                let ip = lsh_fragment::dot_unrolled(self.row(i), self.row(j)).abs();
                sum_abs += f64::from(ip);
                max_abs = max_abs.max(ip);
                pairs += 1;
            }
        }

        let mean_abs_inner_product = if pairs == 0 {
            0.0
        } else {
            (sum_abs / pairs as f64) as f32
        };

        ProjectionQuality {
            mean_abs_inner_product,
            max_abs_inner_product: max_abs,
            orthogonal: max_abs < 0.1,
        }
    }
}

fn sample_iid(prng: &mut Prng, bits: u32, dim: usize) -> Vec<f32> {
    let mut rows = Vec::with_capacity(bits as usize * dim);
    for _ in 0..bits {
        let mut row: Vec<f32> = (0..dim).map(|_| prng.next_gaussian() as f32).collect();
        normalize_in_place(&mut row);
        rows.extend_from_slice(&row);
    }
    rows
}

fn sample_orthogonalized(prng: &mut Prng, bits: u32, dim: usize) -> Vec<f32> {
    let mut rows: Vec<f32> = Vec::with_capacity(bits as usize * dim);

    for k in 0..bits as usize {
        let mut attempts = 0usize;
        let candidate = loop {
            let mut row: Vec<f32> = (0..dim).map(|_| prng.next_gaussian() as f32).collect();

            // Modified Gram-Schmidt against every prior hyperplane, left to
            // right, in a fixed accumulation order so reconstruction is
            // bit-identical across runs.
            for prior in 0..k {
                let prior_row = &rows[prior * dim..(prior + 1) * dim];
                let proj = lsh_fragment::dot_unrolled(&row, prior_row);
                for (r, p) in row.iter_mut().zip(prior_row.iter()) {
                    *r -= proj * *p;
                }
            }

            let residual_norm = lsh_fragment::dot_unrolled(&row, &row).sqrt();
            attempts += 1;
            if residual_norm >= GRAM_SCHMIDT_COLLAPSE_THRESHOLD || attempts >= GRAM_SCHMIDT_MAX_RESAMPLES {
                normalize_in_place(&mut row);
                break row;
            }
            // Numerical collapse: resample this hyperplane from scratch.
        };

        rows.extend_from_slice(&candidate);
    }

    rows
}

fn normalize_in_place(row: &mut [f32]) {
    let norm = lsh_fragment::dot_unrolled(row, row).sqrt();
    if norm > 0.0 {
        for v in row.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bits_over_max() {
        let err = HyperplaneFamily::new(65, 8, 1, HyperplaneMode::IidGaussian).unwrap_err();
        assert_eq!(err, HyperplaneError::TooManyBits { bits: 65 });
    }

    #[test]
    fn rejects_zero_dimension() {
        let err = HyperplaneFamily::new(8, 0, 1, HyperplaneMode::IidGaussian).unwrap_err();
        assert_eq!(err, HyperplaneError::ZeroDimension);
    }

    #[test]
    fn hash_is_deterministic() {
        let family = HyperplaneFamily::new(12, 16, 42, HyperplaneMode::IidGaussian).unwrap();
        let v = EmbeddingVector::new((0..16).map(|i| i as f32 * 0.1 - 0.5).collect());
        let c1 = family.hash(&v).unwrap();
        let c2 = family.hash(&v).unwrap();
        assert_eq!(c1, c2);
    }

    #[test]
    fn hash_is_scale_invariant() {
        let family = HyperplaneFamily::new(12, 16, 7, HyperplaneMode::IidGaussian).unwrap();
        let v = EmbeddingVector::new((0..16).map(|i| (i as f32).sin()).collect());
        let scaled = EmbeddingVector::new(v.as_slice().iter().map(|x| x * 3.0).collect());
        assert_eq!(family.hash(&v).unwrap(), family.hash(&scaled).unwrap());
    }

    #[test]
    fn zero_vector_hashes_to_all_ones() {
        let family = HyperplaneFamily::new(10, 8, 9, HyperplaneMode::IidGaussian).unwrap();
        let zero = EmbeddingVector::new(vec![0.0; 8]);
        let code = family.hash(&zero).unwrap();
        assert_eq!(code.value(), (1u64 << 10) - 1);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let family = HyperplaneFamily::new(8, 16, 1, HyperplaneMode::IidGaussian).unwrap();
        let wrong = EmbeddingVector::new(vec![0.0; 4]);
        assert_eq!(
            family.hash(&wrong),
            Err(HyperplaneError::DimensionMismatch {
                expected: 16,
                actual: 4
            })
        );
    }

    #[test]
    fn orthogonal_family_meets_quality_invariant() {
        let family = HyperplaneFamily::new(16, 64, 13, HyperplaneMode::Orthogonalized).unwrap();
        let report = family.projection_quality();
        assert!(
            report.orthogonal,
            "max pairwise |<h_i,h_j>| = {} should be < 0.1",
            report.max_abs_inner_product
        );
    }

    #[test]
    fn batch_hash_matches_sequential_hash() {
        let family = HyperplaneFamily::new(10, 8, 55, HyperplaneMode::IidGaussian).unwrap();
        let vs: Vec<EmbeddingVector> = (0..20)
            .map(|n| EmbeddingVector::new((0..8).map(|i| ((n * 8 + i) as f32).cos()).collect()))
            .collect();
        let batch = family.batch_hash(&vs).unwrap();
        let sequential: Vec<HashCode> = vs.iter().map(|v| family.hash(v).unwrap()).collect();
        assert_eq!(batch, sequential);
    }

    #[test]
    fn different_seeds_produce_different_families() {
        let a = HyperplaneFamily::new(12, 32, 1, HyperplaneMode::IidGaussian).unwrap();
        let b = HyperplaneFamily::new(12, 32, 2, HyperplaneMode::IidGaussian).unwrap();
        assert_ne!(a.row(0), b.row(0));
    }

    #[test]
    fn k_equals_one_degenerates_gracefully() {
        let family = HyperplaneFamily::new(1, 8, 3, HyperplaneMode::IidGaussian).unwrap();
        let v = EmbeddingVector::new(vec![1.0; 8]);
        let code = family.hash(&v).unwrap();
        assert!(code.value() <= 1);
    }
}
