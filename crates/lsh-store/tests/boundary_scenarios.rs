// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Boundary behaviors from the host-facing contract, exercised through the
//! public `BucketStore` API rather than the inner `Bucket`/`HashTable`
//! units directly.

use lsh_fragment::{BlockKind, Fragment, FragmentId, SourceLocator};
use lsh_hash::HashCode;
use lsh_store::{BucketPolicy, BucketStore};

fn frag(id: &str) -> Fragment {
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
        format!("fn {id}() {{}}"),
    )
}

#[test]
fn l_equals_one_behaves_as_a_single_table_with_no_crash() {
    let mut store = BucketStore::new(1, BucketPolicy::default(), false);
    assert!(store.insert(0, HashCode(7), frag("a")));
    assert!(store.insert(0, HashCode(7), frag("b")));

    let hits = store.query_all(&[vec![HashCode(7)]]);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[&FragmentId::from("a")].table_match_count, 1);
    assert_eq!(hits[&FragmentId::from("b")].table_match_count, 1);
}

#[test]
fn bucket_at_exactly_max_size_spills_to_overflow_when_enabled() {
    let policy = BucketPolicy {
        max_bucket_size: 2,
        overflow_chaining_enabled: true,
        max_chain_length: 1,
    };
    let mut store = BucketStore::new(1, policy, false);
    assert!(store.insert(0, HashCode(1), frag("a")));
    assert!(store.insert(0, HashCode(1), frag("b")));
    // Primary is now full; the third distinct id must spill to overflow.
    assert!(store.insert(0, HashCode(1), frag("c")));
    assert_eq!(store.size(), 3);
}

#[test]
fn bucket_at_exactly_max_size_rejects_when_chaining_disabled() {
    let policy = BucketPolicy {
        max_bucket_size: 2,
        overflow_chaining_enabled: false,
        max_chain_length: 1,
    };
    let mut store = BucketStore::new(1, policy, false);
    assert!(store.insert(0, HashCode(1), frag("a")));
    assert!(store.insert(0, HashCode(1), frag("b")));
    assert!(!store.insert(0, HashCode(1), frag("c")));
    assert_eq!(store.size(), 2);
}

#[test]
fn chain_at_exactly_max_length_all_full_rejects_further_inserts() {
    let policy = BucketPolicy {
        max_bucket_size: 1,
        overflow_chaining_enabled: true,
        max_chain_length: 1,
    };
    let mut store = BucketStore::new(1, policy, false);
    assert!(store.insert(0, HashCode(1), frag("a"))); // primary
    assert!(store.insert(0, HashCode(1), frag("b"))); // overflow slot 0
    assert!(!store.insert(0, HashCode(1), frag("c"))); // chain exhausted
    assert_eq!(store.size(), 2);
}

#[test]
fn query_all_aggregates_distinct_table_matches_across_many_tables() {
    let mut store = BucketStore::new(5, BucketPolicy::default(), false);
    for table_idx in 0..5 {
        store.insert(table_idx, HashCode(3), frag("a"));
    }
    let lists: Vec<Vec<HashCode>> = (0..5).map(|_| vec![HashCode(3)]).collect();
    let hits = store.query_all(&lists);
    assert_eq!(hits[&FragmentId::from("a")].table_match_count, 5);
}
