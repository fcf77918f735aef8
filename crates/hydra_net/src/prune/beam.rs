//! Beam search over edge removals.
//!
//! Each step branches every graph in the beam on the redundant claims whose
//! removal ties the lowest resulting score for that graph, deduplicates the
//! branches by edge set and keeps the best `beam_width` of them. Graphs with
//! no redundant claim left are set aside as completed trees.

use crate::graph::{Edge, NetworkGraph};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

pub(super) fn resolve(graph: &mut NetworkGraph, beam_width: usize, rng: &mut impl Rng) {
    let beam_width = beam_width.max(1);
    let mut beam = vec![(graph.network_score(), graph.clone())];
    let mut completed: Vec<(f64, NetworkGraph)> = Vec::new();
    let mut step = 0usize;

    while !beam.is_empty() {
        let mut branches: Vec<(f64, NetworkGraph)> = Vec::new();
        let mut seen: HashSet<Vec<Edge>> = HashSet::new();

        for (score, candidate) in beam {
            let mut redundant = candidate.redundant_edges();
            if redundant.is_empty() {
                completed.push((score, candidate));
                continue;
            }
            redundant.shuffle(rng);

            let mut tied: Vec<(f64, NetworkGraph)> = Vec::new();
            for edge in redundant {
                let mut next = candidate.clone();
                next.remove_edge(edge.parent, edge.child);
                let next_score = next.network_score();
                match tied.first().map(|t| t.0) {
                    Some(best) if next_score > best => {}
                    Some(best) if next_score < best => {
                        tied.clear();
                        tied.push((next_score, next));
                    }
                    _ => tied.push((next_score, next)),
                }
            }
            for (next_score, next) in tied {
                if seen.insert(next.edge_list()) {
                    branches.push((next_score, next));
                }
            }
        }

        branches.sort_by(|a, b| a.0.total_cmp(&b.0));
        branches.truncate(beam_width);
        step += 1;
        debug!(
            "beam step {step}: {} live, {} completed, best {:?}",
            branches.len(),
            completed.len(),
            branches.first().map(|b| b.0)
        );
        beam = branches;
    }

    let mut best: Option<(f64, NetworkGraph)> = None;
    for (score, tree) in completed {
        if best.as_ref().map_or(true, |(b, _)| score < *b) {
            best = Some((score, tree));
        }
    }
    if let Some((_, tree)) = best {
        *graph = tree;
    }
}
