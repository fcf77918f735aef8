//! FIFO load model.
//!
//! Estimates the worst-case buffer occupancy of each chip when every chip in
//! the network triggers at once. A chip serves its children in ascending
//! order of subtree size, so small subtrees drain first; the recurrence in
//! [`fifo_load`] sums the occupancy contributed at each service step.
//!
//! The network score combines the worst chip with the average chip:
//! `max(load) + mean(load)`, taken over chips only.

use crate::graph::NetworkGraph;
use crate::ids::NodeId;

/// Computes the FIFO load of a chip from its children's subtree sizes.
///
/// `subtree_sizes` holds, per child, the child's descendant count plus one;
/// order does not matter. With `d` children and `S` the sizes sorted
/// ascending:
///
/// ```text
/// L(-1) = 1
/// L(0)  = d - 1
/// L(1)  = (d - 1) * (S[0] - 1)
/// L(i)  = (d - i) * (S[i-1] - S[i-2])   for i >= 2
/// load  = sum of L(i) for i in -1..d
/// ```
///
/// A chip without children has load 0.
pub fn fifo_load(subtree_sizes: &[u64]) -> u64 {
    let d = subtree_sizes.len() as u64;
    if d == 0 {
        return 0;
    }
    let mut sizes = subtree_sizes.to_vec();
    sizes.sort_unstable();

    let mut load = 1 + (d - 1);
    load += (d - 1) * sizes[0].saturating_sub(1);
    for i in 2..sizes.len() {
        load += (d - i as u64) * (sizes[i - 1] - sizes[i - 2]);
    }
    load
}

/// Aggregate load figures for a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// Highest load of any chip.
    pub max: u64,
    /// Sum of all chip loads.
    pub total: u64,
    /// Number of chips scored.
    pub chips: usize,
}

impl LoadStats {
    /// Returns the mean chip load (0 for an empty network).
    pub fn mean(&self) -> f64 {
        if self.chips == 0 {
            0.0
        } else {
            self.total as f64 / self.chips as f64
        }
    }

    /// Returns the network score `max + mean`. Lower is better.
    pub fn score(&self) -> f64 {
        self.max as f64 + self.mean()
    }
}

impl NetworkGraph {
    /// Returns the FIFO load of `id` under the current edges.
    ///
    /// The external link is never a data source: it has load 0 and is not
    /// counted as a child of the root. Cached until an edge below `id`
    /// changes.
    pub fn load(&mut self, id: NodeId) -> u64 {
        if let Some(load) = self.loads[id.index()] {
            return load;
        }
        if !self.is_chip(id) {
            self.loads[id.index()] = Some(0);
            return 0;
        }
        let children: Vec<NodeId> = self.children(id).filter(|&c| self.is_chip(c)).collect();
        let sizes: Vec<u64> = children
            .into_iter()
            .map(|child| self.descendants(child) + 1)
            .collect();
        let load = fifo_load(&sizes);
        self.loads[id.index()] = Some(load);
        load
    }

    /// Computes the load of every chip and aggregates it.
    pub fn load_stats(&mut self) -> LoadStats {
        let mut stats = LoadStats::default();
        for index in 0..self.nodes.len() {
            let id = NodeId::from_raw(index as u32);
            if !self.is_chip(id) {
                continue;
            }
            let load = self.load(id);
            stats.max = stats.max.max(load);
            stats.total += load;
            stats.chips += 1;
        }
        stats
    }

    /// Returns the network score `max(load) + mean(load)` over all chips.
    pub fn network_score(&mut self) -> f64 {
        self.load_stats().score()
    }
}
