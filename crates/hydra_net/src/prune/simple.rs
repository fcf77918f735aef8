//! Single-edge greedy pruning.

use crate::graph::{Edge, NetworkGraph};
use rand::seq::SliceRandom;
use rand::Rng;

/// Removes, one at a time, the redundant claim whose endpoints carry the
/// most descendants between them.
pub(super) fn resolve_heaviest(graph: &mut NetworkGraph, rng: &mut impl Rng) {
    while remove_best(graph, rng, heaviest_pair).is_some() {}
}

/// Removes, one at a time, a redundant claim on the chip with the fewest
/// descendants.
pub(super) fn resolve_lightest_child(graph: &mut NetworkGraph, rng: &mut impl Rng) {
    while remove_best(graph, rng, lightest_child).is_some() {}
}

fn heaviest_pair(graph: &mut NetworkGraph, edge: Edge) -> i64 {
    (graph.descendants(edge.child) + graph.descendants(edge.parent)) as i64
}

fn lightest_child(graph: &mut NetworkGraph, edge: Edge) -> i64 {
    -(graph.descendants(edge.child) as i64)
}

/// Removes the redundant edge with the highest `metric` and returns it, or
/// returns `None` once no redundant edge is left.
///
/// Candidates are shuffled before the pick and the first maximum wins, so
/// the seed decides between equally ranked edges.
fn remove_best(
    graph: &mut NetworkGraph,
    rng: &mut impl Rng,
    metric: fn(&mut NetworkGraph, Edge) -> i64,
) -> Option<Edge> {
    let mut candidates = graph.redundant_edges();
    candidates.shuffle(rng);
    let (&first, rest) = candidates.split_first()?;

    let mut best = first;
    let mut best_value = metric(graph, best);
    for &edge in rest {
        let value = metric(graph, edge);
        if value > best_value {
            best = edge;
            best_value = value;
        }
    }
    graph.remove_edge(best.parent, best.child);
    Some(best)
}
