//! Single-walk sampling: the second-order step loop over transition classes.

use crate::transition::{TransitionClasses, TransitionClassifier, WalkMode};
use crate::{Error, Result};
use rand::prelude::*;

/// How many class draws a single step may burn before the walk is declared
/// stuck. Redraws only happen when the drawn class is empty while another is
/// not, so hitting this cap means the draw repeatedly landed on empty mass.
pub const MAX_CLASS_DRAWS: u32 = 64;

/// Parameters for one corpus-generation run.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkConfig {
    /// Probability mass for class0.
    pub alpha: f32,
    /// Probability mass for class1; class2 gets `1 - alpha - beta`.
    pub beta: f32,
    /// Maximum walk length in steps (nodes appended after the source).
    pub steps: usize,
    /// Walks generated per start node.
    pub num_walks: usize,
    /// Degree threshold `k`; only consulted in `Biased_Random_Walk` mode.
    pub degree_threshold: usize,
    pub mode: WalkMode,
    pub directed: bool,
    /// Master seed; every derived RNG stream is a pure function of it.
    pub seed: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            alpha: 0.8,
            beta: 0.2,
            steps: 50,
            num_walks: 2,
            degree_threshold: 100,
            mode: WalkMode::BiasedRandomWalk,
            directed: false,
            seed: 42,
        }
    }
}

impl WalkConfig {
    /// Check the probability budget and counts once, before any walk runs.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::InvalidParameter(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return Err(Error::InvalidParameter(format!(
                "beta must be in [0, 1], got {}",
                self.beta
            )));
        }
        if self.alpha + self.beta > 1.0 {
            return Err(Error::InvalidParameter(format!(
                "alpha + beta must not exceed 1, got {}",
                self.alpha + self.beta
            )));
        }
        if self.steps == 0 {
            return Err(Error::InvalidParameter("steps must be positive".into()));
        }
        if self.num_walks == 0 {
            return Err(Error::InvalidParameter("num_walks must be positive".into()));
        }
        Ok(())
    }
}

/// Map one uniform draw `r` in `[0, 1)` to a class index: class0 iff
/// `r < alpha`, class1 iff `alpha <= r < alpha + beta`, class2 otherwise.
pub fn select_class(r: f32, alpha: f32, beta: f32) -> usize {
    if r < alpha {
        0
    } else if r < alpha + beta {
        1
    } else {
        2
    }
}

/// Sample one walk continuation from `source`.
///
/// Returns at most `steps` node ids, the source itself excluded; every
/// consecutive pair (and `(source, result[0])`) is an edge of the graph.
/// A node whose classes are all empty ends the walk early (dead end, not an
/// error). A step whose draws keep landing on empty classes while another
/// class has members fails with [`Error::WalkStuck`].
pub fn walk<R: Rng>(
    classifier: &TransitionClassifier<'_>,
    source: u64,
    steps: usize,
    alpha: f32,
    beta: f32,
    rng: &mut R,
) -> Result<Vec<u64>> {
    let mut seq = Vec::with_capacity(steps);
    let mut prev: Option<u64> = None;
    let mut curr = source;

    // Iterative on purpose: a recursive step per node would grow the stack
    // linearly with walk length.
    for _ in 0..steps {
        let classes = classifier.classify(prev, curr)?;
        if classes.all_empty() {
            break;
        }
        let next = sample_step(&classes, alpha, beta, curr, rng)?;
        seq.push(next);
        prev = Some(curr);
        curr = next;
    }

    Ok(seq)
}

fn sample_step<R: Rng>(
    classes: &TransitionClasses,
    alpha: f32,
    beta: f32,
    node: u64,
    rng: &mut R,
) -> Result<u64> {
    for _ in 0..MAX_CLASS_DRAWS {
        let r: f32 = rng.random();
        let class = classes.class(select_class(r, alpha, beta));
        if let Some(&x) = class.choose(rng) {
            return Ok(x);
        }
    }
    Err(Error::WalkStuck { node, attempts: MAX_CLASS_DRAWS })
}
