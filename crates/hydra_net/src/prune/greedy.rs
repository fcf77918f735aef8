//! Random breadth-first tree.

use crate::graph::{Edge, NetworkGraph};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Grows a tree from the root one layer at a time. Nodes of a layer and
/// their children are visited in shuffled order, and each node is claimed by
/// the first visited parent that can reach it. Loads are ignored.
pub(super) fn resolve(graph: &mut NetworkGraph, rng: &mut impl Rng) {
    let mut attached = vec![false; graph.node_count()];
    attached[graph.root().index()] = true;
    let mut kept: HashSet<Edge> = HashSet::new();
    let mut frontier = vec![graph.root()];

    while !frontier.is_empty() {
        frontier.shuffle(rng);
        let mut next = Vec::new();
        for &parent in &frontier {
            let mut children: Vec<_> = graph.children(parent).collect();
            children.shuffle(rng);
            for child in children {
                if !attached[child.index()] {
                    attached[child.index()] = true;
                    kept.insert(Edge::new(parent, child));
                    next.push(child);
                }
            }
        }
        frontier = next;
    }

    for edge in graph.edge_list() {
        if !kept.contains(&edge) {
            graph.remove_edge(edge.parent, edge.child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_candidate_graph, GridSpec};
    use crate::prune::prepare;
    use hydra_common::Coord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tree_follows_shortest_hops() {
        let grid = GridSpec::new(4, 4, Coord::new(0, 0), Coord::new(-1, 0));
        let mut g = build_candidate_graph(&grid).unwrap();
        prepare(&mut g);
        resolve(&mut g, &mut StdRng::seed_from_u64(21));
        assert!(g.validate_arborescence().is_ok());
        for edge in g.edges() {
            if edge.child == g.ext() {
                continue;
            }
            let (p, c) = (g.coord(edge.parent), g.coord(edge.child));
            assert_eq!(c.x + c.y, p.x + p.y + 1);
        }
    }

    #[test]
    fn seeds_change_the_tree() {
        let grid = GridSpec::new(5, 5, Coord::new(2, 2), Coord::new(2, -1));
        let run = |seed| {
            let mut g = build_candidate_graph(&grid).unwrap();
            prepare(&mut g);
            resolve(&mut g, &mut StdRng::seed_from_u64(seed));
            g.edge_list()
        };
        let distinct: HashSet<_> = (0..8).map(run).collect();
        assert!(distinct.len() > 1);
    }
}
