//! End-to-end sketch: edge list → second-order biased walks → corpus lines.
//!
//! Exercises the seams an embedding pipeline cares about:
//! - `biaswalk::parse_edge_list` + `EdgeListGraph` for graph loading
//! - `biaswalk::generate_corpus_from_nodes` for the walk corpus
//! - `biaswalk::write_corpus` for the trainer-facing line format
//!
//! Run with an edge-list path to use your own graph, or with no arguments to
//! use a small two-community toy graph:
//!
//! ```bash
//! cargo run --example generate_corpus [edgelist.txt]
//! ```

use biaswalk::{
    generate_corpus_from_nodes, parse_edge_list, write_corpus, EdgeListGraph, WalkConfig, WalkMode,
};
use std::io::BufReader;

fn toy_edges() -> Vec<(u64, u64)> {
    // Two triangles bridged by a single edge.
    vec![(1, 2), (2, 3), (1, 3), (3, 4), (4, 5), (5, 6), (4, 6)]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let edges = match std::env::args().nth(1) {
        Some(path) => {
            let file = std::fs::File::open(&path)?;
            parse_edge_list(BufReader::new(file))?
        }
        None => toy_edges(),
    };

    let graph = EdgeListGraph::from_edges(&edges, false)?;
    eprintln!("graph: {} nodes, undirected", graph.node_count());

    let config = WalkConfig {
        alpha: 0.6,
        beta: 0.2,
        steps: 20,
        num_walks: 3,
        degree_threshold: 2,
        mode: WalkMode::BiasedRandomWalk,
        directed: false,
        seed: 42,
    };
    config.validate()?;

    let run = generate_corpus_from_nodes(&graph, graph.nodes(), &config)?;
    eprintln!("generated {} walks ({} stuck, dropped)", run.walks.len(), run.stuck);

    write_corpus(std::io::stdout().lock(), &run.walks)?;
    Ok(())
}
