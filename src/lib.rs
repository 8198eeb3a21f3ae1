//! `biaswalk`: second-order biased random walk corpus generation.
//!
//! Produces walk corpora for graph-embedding trainers (node2vec-style
//! skip-gram input): one sequence of node ids per walk. At every step the
//! choice of the next node is biased by the *previous* node of the walk,
//! making the process a second-order Markov chain over edges.
//!
//! Pipeline (one-way data flow):
//! - [`EdgeListGraph`]: adjacency + edge-existence index, built once from an
//!   edge list and immutable afterwards.
//! - [`TransitionClassifier`]: partitions a node's neighbors into three
//!   disjoint classes relative to the walk's previous node, memoized per
//!   `(prev, current)` pair.
//! - [`walk`]: the per-walk sampler driving the class-then-neighbor draw.
//! - [`corpus`]: start-node iteration, per-walk failure isolation, and the
//!   line-oriented output format.
//!
//! Public invariants (must not drift):
//! - **Partition**: the three transition classes are pairwise disjoint and
//!   their union is exactly the neighbor set of the current node.
//! - **Determinism**: a fixed seed reproduces an identical corpus, including
//!   under the `parallel` feature regardless of thread count.
//! - **Edge validity**: every consecutive pair in an emitted walk is a real
//!   edge of the input graph.

pub mod corpus;
pub mod graph;
pub mod transition;
pub mod walk;

pub use corpus::{generate_corpus, generate_corpus_from_nodes, write_corpus, CorpusRun};
pub use graph::{parse_edge_list, EdgeListGraph};
pub use transition::{TransitionClasses, TransitionClassifier, WalkMode};
pub use walk::{select_class, walk, WalkConfig};

#[cfg(feature = "parallel")]
pub use corpus::generate_corpus_parallel_from_nodes;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graph load failed: {0}")]
    GraphLoad(String),
    #[error("unknown node id: {0}")]
    UnknownNode(u64),
    #[error("unrecognized walk mode: {0:?} (expected \"Biased_Random_Walk\" or \"Node2Vec\")")]
    InvalidMode(String),
    #[error("walk stuck at node {node}: no non-empty class after {attempts} draws")]
    WalkStuck { node: u64, attempts: u32 },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
