// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Smoke-test binary for the random-hyperplane LSH clone index.
//!
//! The parser, embedding model, editor integration, and report surface that
//! would normally drive this index are external collaborators this
//! workspace does not own — this binary exists only to exercise the core
//! crates end to end with synthetic embeddings, not to stand in for them.

#![deny(rust_2018_idioms)]
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
    clippy::dbg_macro
)]
#![allow(clippy::print_stdout, clippy::print_stderr, clippy::missing_errors_doc)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lsh_clones::{ClassifiedQueryOptions, CloneEngine, FindAllClonesOptions};
use lsh_fragment::{BlockKind, EmbeddingVector, Fragment, FragmentId, SourceLocator};
use lsh_index::{IndexConfig, LshIndex, QueryOptions};
use lsh_persist::{load_index, save_index, FsKvStore};

/// Smoke-test harness for the LSH clone index.
#[derive(Parser)]
#[command(name = "lsh-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a small synthetic index, query it, and cluster it, printing a
    /// summary of each stage.
    Demo {
        /// Embedding dimension for the synthetic vectors.
        #[arg(long, default_value_t = 16)]
        dimension: usize,
        /// Number of hash tables.
        #[arg(long, default_value_t = 8)]
        num_tables: usize,
        /// Hash width in bits.
        #[arg(long, default_value_t = 10)]
        num_bits: u32,
    },
    /// Round-trip a synthetic index through a filesystem-backed store.
    PersistRoundTrip {
        /// Directory the index is saved to and reloaded from.
        #[arg(long)]
        dir: PathBuf,
        /// Embedding dimension for the synthetic vectors.
        #[arg(long, default_value_t = 16)]
        dimension: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Demo {
            dimension,
            num_tables,
            num_bits,
        } => run_demo(dimension, num_tables, num_bits),
        Command::PersistRoundTrip { dir, dimension } => run_persist_round_trip(&dir, dimension),
    }
}

fn synthetic_fragment(id: &str, text: &str) -> Fragment {
    Fragment::new(
        FragmentId::from(id),
        SourceLocator {
            path: format!("demo/{id}.rs"),
            start_line: 1,
            end_line: 3,
            start_col: 0,
            end_col: 0,
        },
        "rust".to_string(),
        BlockKind::Function,
        text.to_string(),
    )
}

/// Deterministic, low-dimensional stand-in for a real embedding model: a
/// base vector perturbed by a small offset so near-duplicates land close in
/// cosine space without depending on an external embedder.
fn synthetic_embedding(dimension: usize, base: f32, offset: f32) -> EmbeddingVector {
    let components: Vec<f32> = (0..dimension)
        .map(|i| base + offset * ((i % 5) as f32 - 2.0))
        .collect();
    EmbeddingVector::new(components)
}

fn run_demo(dimension: usize, num_tables: usize, num_bits: u32) -> Result<()> {
    let config = IndexConfig {
        num_tables,
        num_bits,
        dimension,
        seed: 7,
        ..IndexConfig::default()
    };
    let mut index = LshIndex::new(config).context("building index")?;

    let fragments = [
        ("a", "fn add(x: i32, y: i32) -> i32 { x + y }", 1.0, 0.0),
        ("b", "fn add(a: i32, b: i32) -> i32 { a + b }", 1.0, 0.02),
        ("c", "fn subtract(x: i32, y: i32) -> i32 { x - y }", -1.0, 0.0),
    ];
    for (id, text, base, offset) in fragments {
        let embedding = synthetic_embedding(dimension, base, offset);
        index
            .insert(synthetic_fragment(id, text), embedding)
            .with_context(|| format!("inserting fragment {id}"))?;
    }
    println!("indexed {} fragments", index.len());

    let query_vector = synthetic_embedding(dimension, 1.0, 0.0);
    let mut engine = CloneEngine::new(&mut index);
    let query_opts = ClassifiedQueryOptions {
        query: QueryOptions {
            min_similarity: 0.5,
            ..QueryOptions::default()
        },
        ..ClassifiedQueryOptions::default()
    };
    let response = engine.query(&query_vector, &query_opts).context("querying index")?;
    println!(
        "query surfaced {} of {} candidates in {:?}",
        response.results.len(),
        response.total_candidates,
        response.elapsed
    );
    for hit in &response.results {
        println!(
            "  {} similarity={:.4} type={:?}",
            hit.result.fragment_id,
            hit.result.ranking_similarity(),
            hit.clone_type
        );
    }

    let clusters = engine
        .find_all_clones(FindAllClonesOptions::default())
        .context("clustering index")?;
    println!("found {} cluster(s)", clusters.len());
    for cluster in &clusters {
        println!(
            "  {:?} avg_similarity={:.4} members={:?}",
            cluster.clone_type, cluster.avg_similarity, cluster.members
        );
    }

    Ok(())
}

fn run_persist_round_trip(dir: &PathBuf, dimension: usize) -> Result<()> {
    let config = IndexConfig {
        num_tables: 8,
        num_bits: 10,
        dimension,
        seed: 13,
        ..IndexConfig::default()
    };
    let mut index = LshIndex::new(config.clone()).context("building index")?;
    index
        .insert(
            synthetic_fragment("a", "fn a() {}"),
            synthetic_embedding(dimension, 1.0, 0.0),
        )
        .context("inserting fragment")?;

    let store = FsKvStore::new(dir).context("opening filesystem store")?;
    save_index(&index, &store).context("saving index")?;
    println!("saved {} fragment(s) to {}", index.len(), dir.display());

    let reloaded = load_index(config, &store).context("reloading index")?;
    println!("reloaded {} fragment(s) from {}", reloaded.len(), dir.display());
    anyhow::ensure!(reloaded.len() == index.len(), "round trip lost fragments");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_without_error() {
        run_demo(16, 8, 10).unwrap();
    }

    #[test]
    fn persist_round_trip_runs_without_error() {
        let dir = tempfile::tempdir().unwrap();
        run_persist_round_trip(&dir.path().to_path_buf(), 16).unwrap();
    }
}
