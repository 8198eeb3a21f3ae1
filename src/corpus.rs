//! Corpus assembly: start-node iteration, per-walk failure isolation, and
//! the line-oriented output format consumed by embedding trainers.

use crate::graph::EdgeListGraph;
use crate::transition::TransitionClassifier;
use crate::walk::{walk, WalkConfig};
use crate::{Error, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use tracing::{debug, warn};

/// The outcome of one corpus-generation run.
///
/// Each walk is a full output line: the source node id followed by the
/// sampled continuation. Stuck walks are dropped, not truncated, and only
/// counted here; dead-ended walks stay in `walks` (shorter lines).
#[derive(Debug, Clone)]
pub struct CorpusRun {
    pub walks: Vec<Vec<u64>>,
    pub stuck: usize,
}

/// Generate `config.num_walks` walks from every node in `sources`,
/// sequentially, on a single seeded RNG stream.
///
/// Configuration and graph-shape errors abort the run; a stuck walk is
/// isolated, logged, and counted so one bad walk cannot poison the corpus.
pub fn generate_corpus_from_nodes(
    graph: &EdgeListGraph,
    sources: &[u64],
    config: &WalkConfig,
) -> Result<CorpusRun> {
    let classifier = preflight(graph, config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let mut walks = Vec::with_capacity(sources.len() * config.num_walks);
    let mut stuck = 0usize;

    for &source in sources {
        // Fail fast on a source the graph has never seen.
        graph.neighbors(source)?;
        for _ in 0..config.num_walks {
            match walk(&classifier, source, config.steps, config.alpha, config.beta, &mut rng) {
                Ok(continuation) => walks.push(line(source, continuation)),
                Err(Error::WalkStuck { node, attempts }) => {
                    warn!(source, node, attempts, "dropping stuck walk");
                    stuck += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    debug!(
        walks = walks.len(),
        stuck,
        cached_pairs = classifier.cached_pairs(),
        "corpus run complete"
    );
    Ok(CorpusRun { walks, stuck })
}

/// Generate a corpus from a single uniformly drawn start node, for callers
/// that supply none. The draw comes off the same master seed, so the whole
/// run stays reproducible.
pub fn generate_corpus(graph: &EdgeListGraph, config: &WalkConfig) -> Result<CorpusRun> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let source = graph
        .random_node(&mut rng)
        .ok_or_else(|| Error::GraphLoad("graph has no nodes".into()))?;
    generate_corpus_from_nodes(graph, &[source], config)
}

/// Deterministic parallel corpus generation over explicit start nodes.
///
/// Invariant: output is stable for a fixed `config.seed`, independent of the
/// Rayon thread count. Every walk gets its own RNG stream derived from the
/// master seed and the walk's position; the classifier cache is shared and
/// fills concurrently.
#[cfg(feature = "parallel")]
pub fn generate_corpus_parallel_from_nodes(
    graph: &EdgeListGraph,
    sources: &[u64],
    config: &WalkConfig,
) -> Result<CorpusRun> {
    use rayon::prelude::*;

    let classifier = preflight(graph, config)?;
    for &source in sources {
        graph.neighbors(source)?;
    }

    let jobs: Vec<u64> = sources
        .iter()
        .flat_map(|&source| std::iter::repeat(source).take(config.num_walks))
        .collect();

    let results: Vec<Result<Option<Vec<u64>>>> = jobs
        .par_iter()
        .enumerate()
        .map(|(i, &source)| {
            let seed = mix64(config.seed ^ ((i as u64) << 32) ^ source);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            match walk(&classifier, source, config.steps, config.alpha, config.beta, &mut rng) {
                Ok(continuation) => Ok(Some(line(source, continuation))),
                Err(Error::WalkStuck { node, attempts }) => {
                    warn!(source, node, attempts, "dropping stuck walk");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .collect();

    let mut walks = Vec::with_capacity(results.len());
    let mut stuck = 0usize;
    for result in results {
        match result? {
            Some(w) => walks.push(w),
            None => stuck += 1,
        }
    }

    debug!(
        walks = walks.len(),
        stuck,
        cached_pairs = classifier.cached_pairs(),
        "parallel corpus run complete"
    );
    Ok(CorpusRun { walks, stuck })
}

/// Write one space-separated line of node ids per walk.
pub fn write_corpus<W: Write>(mut writer: W, walks: &[Vec<u64>]) -> std::io::Result<()> {
    let mut buf = String::new();
    for walk in walks {
        buf.clear();
        for (i, id) in walk.iter().enumerate() {
            if i > 0 {
                buf.push(' ');
            }
            buf.push_str(&id.to_string());
        }
        writeln!(writer, "{buf}")?;
    }
    Ok(())
}

fn preflight<'g>(
    graph: &'g EdgeListGraph,
    config: &WalkConfig,
) -> Result<TransitionClassifier<'g>> {
    config.validate()?;
    if config.directed != graph.is_directed() {
        return Err(Error::InvalidParameter(format!(
            "config says directed={} but the graph was built with directed={}",
            config.directed,
            graph.is_directed()
        )));
    }
    Ok(TransitionClassifier::new(graph, config.mode, config.degree_threshold))
}

fn line(source: u64, continuation: Vec<u64>) -> Vec<u64> {
    let mut out = Vec::with_capacity(continuation.len() + 1);
    out.push(source);
    out.extend(continuation);
    out
}

#[cfg(feature = "parallel")]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}
