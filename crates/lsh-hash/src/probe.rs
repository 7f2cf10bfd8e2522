// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Multi-probe candidate generation.

use lsh_fragment::EmbeddingVector;

use crate::code::HashCode;
use crate::hyperplane::HyperplaneFamily;

/// Host-configurable multi-probe settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Master switch for probe generation. When `false`, every query
    /// degenerates to a single-probe lookup of the exact code.
    pub enabled: bool,
    /// Probe budget `P` per table at query time.
    pub num_probes: usize,
    /// Whether to use perturbation-scored probe ordering instead of the
    /// deterministic unscored enumeration.
    pub scored: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            num_probes: 8,
            scored: true,
        }
    }
}

/// One candidate code in a probe list, carrying the score it was ranked by
/// (score is `1.0` for the original code; for unscored lists the remaining
/// entries carry a synthetic score that only reflects emission order).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Probe {
    /// The candidate K-bit code to look up.
    pub code: HashCode,
    /// Confidence score used to order the probe list, descending.
    pub score: f32,
}

/// Generates an ordered, de-duplicated probe list of up to `budget` codes
/// for `code`, starting with `code` itself.
///
/// When `cfg.enabled` is `false`, returns a single-element list containing
/// just `code`. When `cfg.scored` is `true` and a query vector is supplied,
/// uses perturbation scoring (`query` and `family` must both be `Some`);
/// otherwise falls back to the deterministic unscored enumeration.
pub fn generate_probes(
    code: HashCode,
    bits: u32,
    cfg: ProbeConfig,
    query: Option<(&EmbeddingVector, &HyperplaneFamily)>,
) -> Vec<Probe> {
    if !cfg.enabled || cfg.num_probes <= 1 {
        return vec![Probe { code, score: 1.0 }];
    }

    match (cfg.scored, query) {
        (true, Some((v, family))) => scored_probes(code, bits, cfg.num_probes, v, family),
        _ => unscored_probes(code, bits, cfg.num_probes),
    }
}

/// Deterministic, vector-independent probe enumeration: `code`, then all
/// single-bit flips in bit-index order, then (if budget remains) all
/// two-bit flips in lexicographic `(i, j)` order.
fn unscored_probes(code: HashCode, bits: u32, budget: usize) -> Vec<Probe> {
    let mut probes = Vec::with_capacity(budget.min(1 + bits as usize + pairs(bits)));
    probes.push(Probe { code, score: 1.0 });

    'outer: for i in 0..bits {
        if probes.len() >= budget {
            break 'outer;
        }
        probes.push(Probe {
            code: code.flip(i),
            score: 0.0,
        });
    }

    'outer2: for i in 0..bits {
        for j in (i + 1)..bits {
            if probes.len() >= budget {
                break 'outer2;
            }
            probes.push(Probe {
                code: code.flip(i).flip(j),
                score: 0.0,
            });
        }
    }

    dedup_preserving_order(probes)
}

fn pairs(bits: u32) -> usize {
    (bits as usize * bits.saturating_sub(1) as usize) / 2
}

/// Perturbation-scored probe ordering.
///
/// Per-bit distances `D_i = |<v, h_i>|` drive flip confidence: the smaller
/// `D_i`, the less sure the original bit was, so it is flipped first.
/// Single-bit flips score `exp(-D_i)`; two-bit flips score
/// `exp(-(D_i + D_j))`. Ties break on lower flipped-bit indices first so two
/// calls for the same `(code, v, family)` always produce the same order.
fn scored_probes(
    code: HashCode,
    bits: u32,
    budget: usize,
    v: &EmbeddingVector,
    family: &HyperplaneFamily,
) -> Vec<Probe> {
    let distances: Vec<f32> = (0..bits)
        .map(|i| {
            let dot = family
                .hash_distance_component(v, i)
                .unwrap_or(0.0);
            dot.abs()
        })
        .collect();

    let mut candidates: Vec<(Probe, (u32, u32))> = Vec::with_capacity(bits as usize + pairs(bits));

    for i in 0..bits {
        let score = (-distances[i as usize]).exp();
        candidates.push((
            Probe {
                code: code.flip(i),
                score,
            },
            (i, u32::MAX),
        ));
    }

    for i in 0..bits {
        for j in (i + 1)..bits {
            let score = (-(distances[i as usize] + distances[j as usize])).exp();
            candidates.push((
                Probe {
                    code: code.flip(i).flip(j),
                    score,
                },
                (i, j),
            ));
        }
    }

    // Sort by score descending; tie-break by lower flipped-bit indices
    // first so the ordering is reproducible regardless of sort stability.
    candidates.sort_by(|a, b| {
        b.0.score
            .partial_cmp(&a.0.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });

    let mut probes = Vec::with_capacity(budget);
    probes.push(Probe { code, score: 1.0 });
    for (probe, _) in candidates {
        if probes.len() >= budget {
            break;
        }
        probes.push(probe);
    }

    dedup_preserving_order(probes)
}

fn dedup_preserving_order(probes: Vec<Probe>) -> Vec<Probe> {
    let mut seen = std::collections::HashSet::with_capacity(probes.len());
    let mut out = Vec::with_capacity(probes.len());
    for p in probes {
        if seen.insert(p.code) {
            out.push(p);
        }
    }
    out
}
