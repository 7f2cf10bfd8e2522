// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Concrete end-to-end clustering scenarios driven through the public
//! `CloneEngine`/`LshIndex` API.

use lsh_clones::{CloneEngine, CloneType, FindAllClonesOptions};
use lsh_fragment::{BlockKind, EmbeddingVector, Fragment, FragmentId, SourceLocator};
use lsh_index::{IndexConfig, LshIndex};

fn frag(id: &str, text: &str) -> Fragment {
    Fragment::new(
        FragmentId::from(id),
        SourceLocator {
            path: "a.rs".into(),
            start_line: 1,
            end_line: 2,
            start_col: 0,
            end_col: 0,
        },
        "rust".into(),
        BlockKind::Function,
        text.to_string(),
    )
}

fn small_index() -> LshIndex {
    LshIndex::new(IndexConfig {
        num_tables: 10,
        num_bits: 12,
        dimension: 8,
        seed: 42,
        ..IndexConfig::default()
    })
    .unwrap()
}

/// Two identical fragments with identical nonzero vectors form exactly one
/// Type-1 cluster of size 2 at avg_similarity 1.0.
#[test]
fn exact_duplicate_detection_yields_one_type1_cluster() {
    let mut index = small_index();
    let v = EmbeddingVector::new(vec![1.0, 0.2, -0.3, 0.4, 0.1, -0.5, 0.6, 0.0]);
    index.insert(frag("a", "x"), v.clone()).unwrap();
    index.insert(frag("b", "x"), v).unwrap();

    let mut engine = CloneEngine::new(&mut index);
    let clusters = engine.find_all_clones(FindAllClonesOptions { min_similarity: 0.85, ..FindAllClonesOptions::default() }).unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].members.len(), 2);
    assert_eq!(clusters[0].clone_type, CloneType::Type1);
    assert!((clusters[0].avg_similarity - 1.0).abs() < 1e-4);
}

/// Orthogonal vectors neither match in query nor cluster.
#[test]
fn unrelated_orthogonal_vectors_are_rejected_everywhere() {
    let mut index = small_index();
    let e0 = EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let e1 = EmbeddingVector::new(vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    index.insert(frag("a", "a-text"), e0.clone()).unwrap();
    index.insert(frag("b", "b-text"), e1).unwrap();

    let mut engine = CloneEngine::new(&mut index);
    let response = engine
        .query(
            &e0,
            &lsh_clones::ClassifiedQueryOptions {
                query: lsh_index::QueryOptions { min_similarity: 0.5, ..lsh_index::QueryOptions::default() },
                ..lsh_clones::ClassifiedQueryOptions::default()
            },
        )
        .unwrap();
    assert!(!response.results.iter().any(|r| r.result.fragment_id == FragmentId::from("b")));

    let clusters = engine.find_all_clones(FindAllClonesOptions::default()).unwrap();
    assert!(clusters.is_empty());
}

/// Five fragments where (1,2), (2,3), (4,5) are near-duplicates and every
/// other pair is unrelated. Expect exactly two clusters, `{1,2,3}` and
/// `{4,5}`, with the size-3 cluster first.
#[test]
fn union_find_clustering_groups_transitively_similar_fragments() {
    let mut index = small_index();

    // Cluster A: three near-identical vectors, small perturbations only.
    let base_a = vec![1.0, 0.1, -0.2, 0.3, 0.0, 0.4, -0.1, 0.2];
    index.insert(frag("1", "shared-a"), EmbeddingVector::new(base_a.clone())).unwrap();
    let mut a2 = base_a.clone();
    a2[0] += 0.01;
    index.insert(frag("2", "shared-a"), EmbeddingVector::new(a2)).unwrap();
    let mut a3 = base_a.clone();
    a3[1] += 0.01;
    index.insert(frag("3", "shared-a"), EmbeddingVector::new(a3)).unwrap();

    // Cluster B: two near-identical vectors orthogonal-ish to cluster A.
    let base_b = vec![0.0, 0.0, 0.0, 0.0, 1.0, -0.2, 0.3, -0.4];
    index.insert(frag("4", "shared-b"), EmbeddingVector::new(base_b.clone())).unwrap();
    let mut b2 = base_b.clone();
    b2[4] += 0.01;
    index.insert(frag("5", "shared-b"), EmbeddingVector::new(b2)).unwrap();

    let mut engine = CloneEngine::new(&mut index);
    let clusters = engine
        .find_all_clones(FindAllClonesOptions { min_similarity: 0.85, ..FindAllClonesOptions::default() })
        .unwrap();

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].members.len(), 3, "the size-3 cluster sorts first");
    assert_eq!(clusters[1].members.len(), 2);

    let mut first_ids: Vec<String> = clusters[0].members.iter().map(|id| id.as_str().to_string()).collect();
    first_ids.sort();
    assert_eq!(first_ids, vec!["1".to_string(), "2".to_string(), "3".to_string()]);

    let mut second_ids: Vec<String> = clusters[1].members.iter().map(|id| id.as_str().to_string()).collect();
    second_ids.sort();
    assert_eq!(second_ids, vec!["4".to_string(), "5".to_string()]);
}
