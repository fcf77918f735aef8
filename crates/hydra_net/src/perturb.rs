//! Perturbation local search.
//!
//! Starting from a pruned tree, each round restores a random handful of the
//! claims that pruning discarded, prunes again with the same strategy and
//! keeps the best resulting tree if it scores strictly lower. Trials within
//! a round run in parallel; their random streams are seeded from the run RNG
//! before dispatch, so the outcome does not depend on thread scheduling.

use crate::graph::{Edge, NetworkGraph};
use crate::prune::Strategy;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Default minimum fractional improvement for another round.
pub const DEFAULT_THRESHOLD: f64 = 0.01;

/// Tuning for [`perturb`].
#[derive(Debug, Clone, PartialEq)]
pub struct PerturbOptions {
    /// Stop once a round improves the score by less than this fraction.
    pub threshold: f64,
    /// Trials per round. Defaults to a quarter of the claims the initial
    /// tree discarded, at least 1.
    pub trials: Option<usize>,
    /// Edges restored per trial. Same default as `trials`.
    pub size: Option<usize>,
    /// Hard cap on rounds.
    pub max_rounds: Option<usize>,
}

impl Default for PerturbOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            trials: None,
            size: None,
            max_rounds: None,
        }
    }
}

/// Outcome of a perturbation search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerturbReport {
    /// Rounds evaluated, including the last one that did not improve.
    pub rounds: usize,
    /// Trials run per round.
    pub trials: usize,
    /// Edges restored per trial.
    pub size: usize,
    /// Score of the tree passed in.
    pub initial_score: f64,
    /// Score of the tree returned.
    pub final_score: f64,
}

/// Improves `tree` by restoring and re-pruning edges from `pool`.
///
/// `pool` is the edge set of the oriented candidate graph the tree was pruned
/// from; each round draws only from the edges the current tree lacks. The
/// returned tree never scores higher than `tree`.
pub fn perturb(
    mut tree: NetworkGraph,
    pool: &[Edge],
    strategy: Strategy,
    options: &PerturbOptions,
    rng: &mut impl Rng,
) -> (NetworkGraph, PerturbReport) {
    let initial_score = tree.network_score();
    let mut best_score = initial_score;
    let discarded = pool
        .iter()
        .filter(|e| !tree.has_edge(e.parent, e.child))
        .count();
    let default_count = (discarded / 4).max(1);
    let trials = options.trials.unwrap_or(default_count).max(1);
    let size = options.size.unwrap_or(default_count).max(1);
    let mut rounds = 0;

    loop {
        if options.max_rounds.is_some_and(|max| rounds >= max) {
            break;
        }
        let mut absent: Vec<Edge> = pool
            .iter()
            .copied()
            .filter(|e| !tree.has_edge(e.parent, e.child))
            .collect();
        if absent.is_empty() {
            break;
        }
        rounds += 1;
        absent.shuffle(rng);
        let seeds: Vec<u64> = (0..trials).map(|_| rng.gen()).collect();

        let results: Vec<(f64, NetworkGraph)> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut trial_rng = StdRng::seed_from_u64(seed);
                let mut candidate = tree.clone();
                for edge in absent.choose_multiple(&mut trial_rng, size) {
                    candidate.add_edge(edge.parent, edge.child);
                }
                let mut pruned = strategy.prune(candidate, &mut trial_rng);
                (pruned.network_score(), pruned)
            })
            .collect();

        let mut winner: Option<(f64, NetworkGraph)> = None;
        for (score, candidate) in results {
            if winner.as_ref().map_or(true, |(w, _)| score < *w) {
                winner = Some((score, candidate));
            }
        }
        let Some((score, candidate)) = winner else {
            break;
        };
        debug!("perturbation round {rounds}: best trial {score}, current {best_score}");
        if score >= best_score {
            break;
        }
        let improvement = (best_score - score) / best_score;
        tree = candidate;
        best_score = score;
        if improvement < options.threshold {
            break;
        }
    }

    (
        tree,
        PerturbReport {
            rounds,
            trials,
            size,
            initial_score,
            final_score: best_score,
        },
    )
}
