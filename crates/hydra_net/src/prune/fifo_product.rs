//! Load-product arborescence pruning.

use super::arborescence::{maximum_arborescence, WeightedEdge};
use crate::graph::NetworkGraph;
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Keeps the spanning arborescence that maximizes the sum of
/// `load(child) * load(parent)` over its edges, resolving every conflict in
/// one global step.
///
/// Edges are shuffled before weighting, which only matters for ties.
pub(super) fn resolve(graph: &mut NetworkGraph, rng: &mut impl Rng) {
    let mut edges = graph.edge_list();
    edges.shuffle(rng);

    let weighted: Vec<WeightedEdge> = edges
        .iter()
        .map(|edge| WeightedEdge {
            from: edge.parent.index(),
            to: edge.child.index(),
            weight: i128::from(graph.load(edge.child)) * i128::from(graph.load(edge.parent)),
        })
        .collect();

    let Some(chosen) = maximum_arborescence(graph.node_count(), graph.root().index(), &weighted)
    else {
        // Only possible if a node lost every parent before this step; the
        // caller's arborescence check reports it.
        warn!("no spanning arborescence exists; leaving the graph unpruned");
        return;
    };

    let keep: HashSet<usize> = chosen.into_iter().flatten().collect();
    for (i, edge) in edges.into_iter().enumerate() {
        if !keep.contains(&i) {
            graph.remove_edge(edge.parent, edge.child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_common::Coord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn keeps_claim_from_heavier_parent() {
        // root -> a, root -> b, a -> c, b -> c, b -> d, d -> e
        let mut g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-1, 0));
        let a = g.add_chip(Coord::new(1, 0));
        let b = g.add_chip(Coord::new(0, 1));
        let c = g.add_chip(Coord::new(1, 1));
        let d = g.add_chip(Coord::new(0, 2));
        let e = g.add_chip(Coord::new(0, 3));
        let (root, ext) = (g.root(), g.ext());
        g.add_edge(root, ext);
        g.add_edge(root, a);
        g.add_edge(root, b);
        g.add_edge(a, c);
        g.add_edge(b, c);
        g.add_edge(b, d);
        g.add_edge(d, e);
        let c_grandchild = g.add_chip(Coord::new(2, 1));
        g.add_edge(c, c_grandchild);

        // load(a) = 1, load(b) = 1 + 1 + 1 * (2 - 1) = 3, load(c) = 1
        resolve(&mut g, &mut StdRng::seed_from_u64(0));
        assert!(g.has_edge(b, c));
        assert!(!g.has_edge(a, c));
        assert!(g.validate_arborescence().is_ok());
    }
}
