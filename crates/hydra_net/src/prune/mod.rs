//! Pruning strategies.
//!
//! Reduces a candidate graph, where chips may be claimed by several parents,
//! to an arborescence rooted at the root chip. Every strategy starts from the
//! same [`prepare`] step, which orients edges away from the root, and then
//! removes redundant parent claims with its own tie-break rule.

mod arborescence;
mod beam;
mod fifo_product;
mod greedy;
mod simple;

use crate::error::NetworkError;
use crate::graph::{Edge, NetworkGraph};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Beam width used when a strategy is selected by name alone.
pub const DEFAULT_BEAM_WIDTH: usize = 4;

/// A pruning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Remove the claim with the heaviest combined descendant count first.
    Simple,
    /// Remove a claim on the chip with the fewest descendants first.
    Simple2,
    /// Keep several candidate graphs ranked by network score.
    BeamSearch {
        /// Candidates kept per step.
        beam_width: usize,
    },
    /// Maximum-weight arborescence over `load(child) * load(parent)`.
    FifoProduct,
    /// Random breadth-first tree, ignoring loads.
    GreedyTree,
}

impl Strategy {
    /// Every strategy name accepted by [`Strategy::from_str`].
    pub const NAMES: [&'static str; 5] = [
        "simple",
        "simple2",
        "beam_search",
        "fifo_product",
        "greedy_tree",
    ];

    /// Returns the strategy's name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Simple => "simple",
            Strategy::Simple2 => "simple2",
            Strategy::BeamSearch { .. } => "beam_search",
            Strategy::FifoProduct => "fifo_product",
            Strategy::GreedyTree => "greedy_tree",
        }
    }

    /// Prunes `graph` to an arborescence rooted at its root chip.
    ///
    /// Accepts the raw candidate graph or any graph already oriented by
    /// [`prepare`], such as a tree with extra claims restored.
    pub fn prune(&self, mut graph: NetworkGraph, rng: &mut impl Rng) -> NetworkGraph {
        prepare(&mut graph);
        match *self {
            Strategy::Simple => simple::resolve_heaviest(&mut graph, rng),
            Strategy::Simple2 => simple::resolve_lightest_child(&mut graph, rng),
            Strategy::BeamSearch { beam_width } => beam::resolve(&mut graph, beam_width, rng),
            Strategy::FifoProduct => fifo_product::resolve(&mut graph, rng),
            Strategy::GreedyTree => greedy::resolve(&mut graph, rng),
        }
        debug_assert!(
            graph.validate_arborescence().is_ok(),
            "{} left an invalid tree",
            self.name()
        );
        graph
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Simple2
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::BeamSearch { beam_width } => write!(f, "beam_search(width={beam_width})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Strategy {
    type Err = NetworkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "simple" => Ok(Strategy::Simple),
            "simple2" => Ok(Strategy::Simple2),
            "beam_search" => Ok(Strategy::BeamSearch {
                beam_width: DEFAULT_BEAM_WIDTH,
            }),
            "fifo_product" => Ok(Strategy::FifoProduct),
            "greedy_tree" => Ok(Strategy::GreedyTree),
            other => Err(NetworkError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Orients the candidate graph away from the root.
///
/// Drops every claim on the root, keeps the external link as a leaf of the
/// root only, then sweeps outward from the root's children: in each
/// frontier, a claim `u -> v` is dropped when `v -> u` also exists and `v`
/// has another parent. Each node is visited once. Afterwards every edge
/// points one hop further from the root, and every reachable chip still has
/// at least one parent. Running it on an already oriented graph changes
/// nothing.
pub fn prepare(graph: &mut NetworkGraph) {
    let root = graph.root();
    let ext = graph.ext();

    let root_parents: Vec<_> = graph.parents(root).collect();
    for parent in root_parents {
        graph.remove_edge(parent, root);
    }
    let ext_children: Vec<_> = graph.children(ext).collect();
    for child in ext_children {
        graph.remove_edge(ext, child);
    }
    let ext_parents: Vec<_> = graph.parents(ext).filter(|&p| p != root).collect();
    for parent in ext_parents {
        graph.remove_edge(parent, ext);
    }
    graph.add_edge(root, ext);

    let mut visited = vec![false; graph.node_count()];
    visited[root.index()] = true;
    visited[ext.index()] = true;
    let mut frontier: Vec<_> = graph.children(root).filter(|&c| c != ext).collect();
    for node in &frontier {
        visited[node.index()] = true;
    }

    while !frontier.is_empty() {
        let view = &*graph;
        let back_claims: Vec<Edge> = frontier
            .iter()
            .filter(|&&v| view.in_degree(v) > 1)
            .flat_map(|&v| {
                view.parents(v)
                    .filter(move |&u| view.has_edge(v, u))
                    .map(move |u| Edge::new(u, v))
            })
            .collect();
        for edge in back_claims {
            graph.remove_edge(edge.parent, edge.child);
        }

        let mut next = Vec::new();
        for &node in &frontier {
            for child in graph.children(node) {
                if !visited[child.index()] {
                    visited[child.index()] = true;
                    next.push(child);
                }
            }
        }
        frontier = next;
    }
}
