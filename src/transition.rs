//! Transition classification: partition a node's neighbors into the three
//! event classes the sampler draws between.
//!
//! The partition for an ordered `(prev, current)` pair is pure, so results
//! are memoized in a concurrent map shared by all walks of a run.

use crate::graph::EdgeListGraph;
use crate::{Error, Result};
use dashmap::DashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The closed set of neighbor-classification strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkMode {
    /// Degree-threshold bias: class0/class1 hold well-connected neighbors
    /// (degree >= k) split by whether they link back to the previous node,
    /// class2 holds the poorly-connected rest.
    BiasedRandomWalk,
    /// Return/explore bias (node2vec p/q analogue): class0 returns to the
    /// previous node, class1 explores away from it, class2 stays among its
    /// common neighbors.
    Node2Vec,
}

impl WalkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalkMode::BiasedRandomWalk => "Biased_Random_Walk",
            WalkMode::Node2Vec => "Node2Vec",
        }
    }
}

impl fmt::Display for WalkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Biased_Random_Walk" => Ok(WalkMode::BiasedRandomWalk),
            "Node2Vec" => Ok(WalkMode::Node2Vec),
            other => Err(Error::InvalidMode(other.to_owned())),
        }
    }
}

/// The three disjoint neighbor classes for one `(prev, current)` pair.
///
/// Invariant: `class(0) ∪ class(1) ∪ class(2)` is exactly the neighbor set of
/// the current node, each neighbor in exactly one class. Lists stay sorted
/// because they are filtered from the graph's sorted neighbor slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionClasses {
    classes: [Vec<u64>; 3],
}

impl TransitionClasses {
    pub fn class(&self, idx: usize) -> &[u64] {
        &self.classes[idx]
    }

    pub fn all_empty(&self) -> bool {
        self.classes.iter().all(Vec::is_empty)
    }
}

/// Classifies and memoizes neighbor partitions for one corpus run.
///
/// Mode and degree threshold are fixed at construction, so the cache key is
/// just the ordered node pair. First-step lookups (`prev == None`) have no
/// pair to key on and are never cached.
///
/// Values are `Arc`s inserted whole, so concurrent walks can never observe a
/// partially written partition; a lost race on insertion only duplicates
/// work, never diverges, because classification is deterministic.
pub struct TransitionClassifier<'g> {
    graph: &'g EdgeListGraph,
    mode: WalkMode,
    degree_threshold: usize,
    cache: DashMap<(u64, u64), Arc<TransitionClasses>>,
}

impl<'g> TransitionClassifier<'g> {
    pub fn new(graph: &'g EdgeListGraph, mode: WalkMode, degree_threshold: usize) -> Self {
        Self { graph, mode, degree_threshold, cache: DashMap::new() }
    }

    pub fn mode(&self) -> WalkMode {
        self.mode
    }

    /// Number of memoized `(prev, current)` pairs.
    pub fn cached_pairs(&self) -> usize {
        self.cache.len()
    }

    /// Partition `current`'s neighbors into the three event classes relative
    /// to `prev`. `prev == None` means the walk has no history yet and uses
    /// the mode's first-step fallback.
    pub fn classify(&self, prev: Option<u64>, current: u64) -> Result<Arc<TransitionClasses>> {
        if let Some(t) = prev {
            if let Some(hit) = self.cache.get(&(t, current)) {
                return Ok(Arc::clone(&hit));
            }
        }

        let computed = Arc::new(self.compute(prev, current)?);

        if let Some(t) = prev {
            // First write wins on a race; both sides computed the same thing.
            return Ok(Arc::clone(
                &self.cache.entry((t, current)).or_insert(computed),
            ));
        }
        Ok(computed)
    }

    fn compute(&self, prev: Option<u64>, current: u64) -> Result<TransitionClasses> {
        let mut classes: [Vec<u64>; 3] = [Vec::new(), Vec::new(), Vec::new()];

        for &x in self.graph.neighbors(current)? {
            let idx = match self.mode {
                WalkMode::BiasedRandomWalk => self.degree_bias_class(prev, x)?,
                WalkMode::Node2Vec => self.return_explore_class(prev, x),
            };
            classes[idx].push(x);
        }

        Ok(TransitionClasses { classes })
    }

    fn degree_bias_class(&self, prev: Option<u64>, x: u64) -> Result<usize> {
        let well_connected = self.graph.degree(x)? >= self.degree_threshold;
        Ok(match prev {
            Some(t) => {
                if well_connected {
                    if self.graph.has_edge(t, x) || self.graph.has_edge(x, t) {
                        0
                    } else {
                        1
                    }
                } else {
                    2
                }
            }
            // Known quirk carried over from the reference behavior: with no
            // history, class1 is never populated, so beta has no effect on
            // the very first transition.
            None => {
                if well_connected {
                    0
                } else {
                    2
                }
            }
        })
    }

    fn return_explore_class(&self, prev: Option<u64>, x: u64) -> usize {
        match prev {
            Some(t) if x == t => 0,
            Some(t) => {
                if self.graph.has_edge(t, x) || self.graph.has_edge(x, t) {
                    2
                } else {
                    1
                }
            }
            // No history to bias against: everything is a "common" move.
            None => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Square with one diagonal: 1-2, 2-3, 3-4, 1-3.
    fn fixture() -> EdgeListGraph {
        EdgeListGraph::from_edges(&[(1, 2), (2, 3), (3, 4), (1, 3)], false).unwrap()
    }

    fn assert_partitions_neighbors(g: &EdgeListGraph, tc: &TransitionClasses, current: u64) {
        let mut union: Vec<u64> = (0..3).flat_map(|i| tc.class(i).iter().copied()).collect();
        union.sort_unstable();
        assert_eq!(union, g.neighbors(current).unwrap(), "union must be the neighbor set");
        for i in 0..3 {
            for j in (i + 1)..3 {
                for x in tc.class(i) {
                    assert!(!tc.class(j).contains(x), "classes {i} and {j} overlap on {x}");
                }
            }
        }
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in [WalkMode::BiasedRandomWalk, WalkMode::Node2Vec] {
            assert_eq!(mode.as_str().parse::<WalkMode>().unwrap(), mode);
        }
        assert!(matches!(
            "node2vec".parse::<WalkMode>(),
            Err(Error::InvalidMode(_))
        ));
    }

    #[test]
    fn degree_bias_partition_at_node_2() {
        // prev=1, current=2, k=2. Neighbors of 2 are {1, 3}.
        // x=1: degree 2 >= k, no edge 1-1 => class1.
        // x=3: degree 3 >= k, edge 1-3 exists => class0.
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::BiasedRandomWalk, 2);
        let tc = cls.classify(Some(1), 2).unwrap();
        assert_eq!(tc.class(0), &[3]);
        assert_eq!(tc.class(1), &[1]);
        assert_eq!(tc.class(2), &[] as &[u64]);
        assert_partitions_neighbors(&g, &tc, 2);
    }

    #[test]
    fn degree_bias_low_degree_neighbors_land_in_class2() {
        // prev=3, current=4 has the single neighbor 3 with degree 3; with a
        // high threshold it drops to class2 regardless of the 3-3 edge test.
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::BiasedRandomWalk, 4);
        let tc = cls.classify(Some(3), 4).unwrap();
        assert_eq!(tc.class(2), &[3]);
        assert!(tc.class(0).is_empty() && tc.class(1).is_empty());
    }

    #[test]
    fn return_explore_partition_at_node_2() {
        // prev=1, current=2: x=1 returns (class0); x=3 is a common neighbor
        // of 1 (edge 1-3), so class2. Nothing explores.
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::Node2Vec, 0);
        let tc = cls.classify(Some(1), 2).unwrap();
        assert_eq!(tc.class(0), &[1]);
        assert_eq!(tc.class(1), &[] as &[u64]);
        assert_eq!(tc.class(2), &[3]);
        assert_partitions_neighbors(&g, &tc, 2);
    }

    #[test]
    fn return_explore_finds_distance_two_neighbors() {
        // prev=2, current=3: x=4 has no edge to 2 => explore (class1).
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::Node2Vec, 0);
        let tc = cls.classify(Some(2), 3).unwrap();
        assert_eq!(tc.class(0), &[2]);
        assert_eq!(tc.class(1), &[4]);
        assert_eq!(tc.class(2), &[1]);
        assert_partitions_neighbors(&g, &tc, 3);
    }

    #[test]
    fn partition_holds_for_every_ordered_pair_in_both_modes() {
        let g = fixture();
        for mode in [WalkMode::BiasedRandomWalk, WalkMode::Node2Vec] {
            let cls = TransitionClassifier::new(&g, mode, 2);
            for &t in g.nodes() {
                for &v in g.nodes() {
                    let tc = cls.classify(Some(t), v).unwrap();
                    assert_partitions_neighbors(&g, &tc, v);
                }
                let tc = cls.classify(None, t).unwrap();
                assert_partitions_neighbors(&g, &tc, t);
            }
        }
    }

    #[test]
    fn first_step_fallback_quirk_never_fills_class1() {
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::BiasedRandomWalk, 2);
        for &v in g.nodes() {
            let tc = cls.classify(None, v).unwrap();
            assert!(tc.class(1).is_empty(), "first-step class1 must stay empty");
        }

        let cls = TransitionClassifier::new(&g, WalkMode::Node2Vec, 0);
        for &v in g.nodes() {
            let tc = cls.classify(None, v).unwrap();
            assert!(tc.class(0).is_empty() && tc.class(1).is_empty());
            assert_eq!(tc.class(2), g.neighbors(v).unwrap());
        }
    }

    #[test]
    fn cache_returns_the_stored_partition_unchanged() {
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::BiasedRandomWalk, 2);
        let first = cls.classify(Some(1), 2).unwrap();
        let second = cls.classify(Some(1), 2).unwrap();
        assert!(Arc::ptr_eq(&first, &second), "hit must return the cached Arc");
        assert_eq!(cls.cached_pairs(), 1);

        // The key is order-sensitive: (2, 1) is a different pair.
        let reversed = cls.classify(Some(2), 1).unwrap();
        assert!(!Arc::ptr_eq(&first, &reversed));
        assert_eq!(cls.cached_pairs(), 2);
    }

    #[test]
    fn first_step_results_are_not_cached() {
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::Node2Vec, 0);
        cls.classify(None, 2).unwrap();
        assert_eq!(cls.cached_pairs(), 0);
    }

    #[test]
    fn unknown_current_node_errors() {
        let g = fixture();
        let cls = TransitionClassifier::new(&g, WalkMode::Node2Vec, 0);
        assert!(matches!(cls.classify(Some(1), 99), Err(Error::UnknownNode(99))));
    }
}
