//! Edge-list graph model: adjacency, degree, and edge-existence lookups.

use crate::{Error, Result};
use rand::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;

/// An unweighted graph built once from an edge list and immutable afterwards.
///
/// Node ids are the raw integer ids from the edge list, not dense indices:
/// corpora are emitted with the caller's own ids, so nothing here renumbers.
///
/// The edge index keeps the *directed* orientation of every input row even
/// when the graph is configured undirected; [`EdgeListGraph::has_edge`] then
/// tests both orientations. Adjacency is symmetrized for undirected graphs.
#[derive(Debug, Clone)]
pub struct EdgeListGraph {
    adjacency: HashMap<u64, Vec<u64>>,
    edges: HashSet<(u64, u64)>,
    nodes: Vec<u64>,
    directed: bool,
}

impl EdgeListGraph {
    /// Build a graph from an edge set.
    ///
    /// Duplicate rows collapse; neighbor lists come out sorted and deduped.
    /// Fails with [`Error::GraphLoad`] on an empty edge set: a zero-node
    /// graph cannot seed any walk.
    pub fn from_edges(edges: &[(u64, u64)], directed: bool) -> Result<Self> {
        if edges.is_empty() {
            return Err(Error::GraphLoad("edge list is empty".into()));
        }

        let edge_set: HashSet<(u64, u64)> = edges.iter().copied().collect();

        let mut adjacency: HashMap<u64, HashSet<u64>> = HashMap::new();
        for &(src, dst) in &edge_set {
            adjacency.entry(src).or_default().insert(dst);
            if directed {
                // A sink node must still be known so walks can dead-end on it.
                adjacency.entry(dst).or_default();
            } else {
                adjacency.entry(dst).or_default().insert(src);
            }
        }

        let adjacency: HashMap<u64, Vec<u64>> = adjacency
            .into_iter()
            .map(|(node, nbrs)| {
                let mut nbrs: Vec<u64> = nbrs.into_iter().collect();
                nbrs.sort_unstable();
                (node, nbrs)
            })
            .collect();

        let mut nodes: Vec<u64> = adjacency.keys().copied().collect();
        nodes.sort_unstable();

        Ok(Self { adjacency, edges: edge_set, nodes, directed })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All known node ids, ascending.
    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Sorted neighbor list of `node`, or [`Error::UnknownNode`] if the id
    /// never appeared in the edge list.
    pub fn neighbors(&self, node: u64) -> Result<&[u64]> {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .ok_or(Error::UnknownNode(node))
    }

    pub fn degree(&self, node: u64) -> Result<usize> {
        Ok(self.neighbors(node)?.len())
    }

    /// Whether an edge from `a` to `b` exists. Undirected graphs test both
    /// orientations against the raw edge set.
    pub fn has_edge(&self, a: u64, b: u64) -> bool {
        if self.directed {
            self.edges.contains(&(a, b))
        } else {
            self.edges.contains(&(a, b)) || self.edges.contains(&(b, a))
        }
    }

    /// Uniform choice over all known nodes; `None` only for the impossible
    /// empty graph. The RNG is caller-supplied so start-node selection is
    /// reproducible.
    pub fn random_node<R: Rng>(&self, rng: &mut R) -> Option<u64> {
        self.nodes.choose(rng).copied()
    }
}

/// Parse a whitespace-separated edge list: one `<src> <dst>` integer pair per
/// line. Blank lines and `#` comments are skipped; anything else malformed is
/// an [`Error::GraphLoad`] rather than silently dropped data.
pub fn parse_edge_list<R: BufRead>(reader: R) -> Result<Vec<(u64, u64)>> {
    let mut edges = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut it = line.split_whitespace();
        let src = it
            .next()
            .ok_or_else(|| Error::GraphLoad(format!("line {}: missing src", line_no + 1)))?;
        let dst = it
            .next()
            .ok_or_else(|| Error::GraphLoad(format!("line {}: missing dst", line_no + 1)))?;
        let src: u64 = src.parse().map_err(|e| {
            Error::GraphLoad(format!("line {}: bad src {src:?}: {e}", line_no + 1))
        })?;
        let dst: u64 = dst.parse().map_err(|e| {
            Error::GraphLoad(format!("line {}: bad dst {dst:?}: {e}", line_no + 1))
        })?;
        edges.push((src, dst));
    }
    Ok(edges)
}
