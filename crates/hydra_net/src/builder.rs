//! Candidate graph construction.
//!
//! Turns a [`GridSpec`] into the bidirectional candidate graph that the
//! pruning strategies reduce to a tree: every pair of 4-adjacent live slots
//! is connected both ways, the external link is connected both ways to any
//! slot next to its coordinate, and the root is always connected to the
//! external link.

use crate::error::NetworkError;
use crate::graph::NetworkGraph;
use crate::ids::NodeId;
use hydra_common::Coord;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// The physical layout a network is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSpec {
    /// Number of slots along x.
    pub width: u32,
    /// Number of slots along y.
    pub height: u32,
    /// Slot of the chip wired to the external link.
    pub root: Coord,
    /// Position of the external link; may lie outside the grid.
    pub ext: Coord,
    /// Slots without a chip.
    pub avoid: BTreeSet<Coord>,
}

impl GridSpec {
    /// Creates a grid description with no excluded slots.
    pub fn new(width: u32, height: u32, root: Coord, ext: Coord) -> Self {
        Self {
            width,
            height,
            root,
            ext,
            avoid: BTreeSet::new(),
        }
    }

    /// Adds slots to the exclusion set.
    pub fn with_avoid(mut self, avoid: impl IntoIterator<Item = Coord>) -> Self {
        self.avoid.extend(avoid);
        self
    }

    /// Returns whether `coord` is inside the grid rectangle.
    pub fn in_grid(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Returns whether `coord` holds a chip.
    pub fn is_live(&self, coord: Coord) -> bool {
        self.in_grid(coord) && !self.avoid.contains(&coord)
    }

    /// Checks the description before any search begins.
    ///
    /// Besides the shape checks, every live slot must be connected to the
    /// root through other live slots, since the tree has to span them all.
    pub fn validate(&self) -> Result<(), NetworkError> {
        self.validate_layout()?;
        self.connected_slots().map(|_| ())
    }

    fn validate_layout(&self) -> Result<(), NetworkError> {
        if self.width == 0 || self.height == 0 {
            return Err(NetworkError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        for dim in [self.width, self.height] {
            if dim > i32::MAX as u32 {
                return Err(NetworkError::GridTooLarge(dim));
            }
        }
        if !self.in_grid(self.root) {
            return Err(NetworkError::RootOutOfBounds {
                root: self.root,
                width: self.width,
                height: self.height,
            });
        }
        if self.avoid.contains(&self.root) {
            return Err(NetworkError::RootExcluded(self.root));
        }
        if self.is_live(self.ext) {
            return Err(NetworkError::ExtOverlapsGrid(self.ext));
        }
        Ok(())
    }

    /// Flood-fills live slots from the root, failing if any live slot is
    /// left unreached.
    fn connected_slots(&self) -> Result<BTreeSet<Coord>, NetworkError> {
        let mut reached = BTreeSet::from([self.root]);
        let mut queue = VecDeque::from([self.root]);
        while let Some(coord) = queue.pop_front() {
            for neighbor in coord.neighbors() {
                if self.is_live(neighbor) && reached.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        let live = self.live_slot_count();
        let missing = live - reached.len() as u64;
        if missing > 0 {
            let first = (0..self.height as i32)
                .flat_map(|y| (0..self.width as i32).map(move |x| Coord::new(x, y)))
                .find(|&c| self.is_live(c) && !reached.contains(&c))
                .unwrap_or(self.root);
            return Err(NetworkError::UnreachableSlots {
                count: missing,
                first,
                root: self.root,
            });
        }
        Ok(reached)
    }

    fn live_slot_count(&self) -> u64 {
        let total = u64::from(self.width) * u64::from(self.height);
        let avoided = self.avoid.iter().filter(|&&c| self.in_grid(c)).count() as u64;
        total - avoided
    }
}

/// Builds the candidate graph for `grid`.
///
/// Fails, before any node is created, if `grid` does not pass
/// [`GridSpec::validate`].
pub fn build_candidate_graph(grid: &GridSpec) -> Result<NetworkGraph, NetworkError> {
    grid.validate_layout()?;
    let reachable = grid.connected_slots()?;

    let mut graph = NetworkGraph::new(grid.root, grid.ext);
    let mut ids: BTreeMap<Coord, NodeId> = BTreeMap::new();
    for &coord in &reachable {
        ids.insert(coord, graph.add_chip(coord));
    }

    for (&coord, &id) in &ids {
        for neighbor in coord.neighbors() {
            if let Some(&other) = ids.get(&neighbor) {
                graph.add_edge(id, other);
            }
        }
    }

    let ext = graph.ext();
    for neighbor in grid.ext.neighbors() {
        if let Some(&other) = ids.get(&neighbor) {
            graph.add_edge(ext, other);
            graph.add_edge(other, ext);
        }
    }
    let root = graph.root();
    graph.add_edge(root, ext);
    graph.add_edge(ext, root);

    debug!(
        "candidate graph: {} chips, {} edges",
        graph.chip_count(),
        graph.edge_count()
    );
    Ok(graph)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn spec_2x2() -> GridSpec {
        GridSpec::new(2, 2, Coord::new(0, 0), Coord::new(-1, 0))
    }

    #[test]
    fn two_by_two_is_fully_bidirectional() {
        let g = build_candidate_graph(&spec_2x2()).unwrap();
        assert_eq!(g.chip_count(), 4);
        assert_eq!(g.node_count(), 5);
        // 4 grid adjacencies both ways + root <-> ext
        assert_eq!(g.edge_count(), 10);
        for edge in g.edges() {
            assert!(g.has_edge(edge.child, edge.parent));
        }
    }

    #[test]
    fn ext_connects_to_adjacent_slots() {
        let grid = GridSpec::new(3, 3, Coord::new(1, 0), Coord::new(0, -1));
        let g = build_candidate_graph(&grid).unwrap();
        let corner = g.chip_at(Coord::new(0, 0)).unwrap();
        assert!(g.has_edge(g.ext(), corner));
        assert!(g.has_edge(corner, g.ext()));
        assert!(g.has_edge(g.root(), g.ext()));
        assert!(g.has_edge(g.ext(), g.root()));
    }

    #[test]
    fn excluded_slots_have_no_node() {
        let grid = spec_2x2().with_avoid([Coord::new(1, 1)]);
        let g = build_candidate_graph(&grid).unwrap();
        assert_eq!(g.chip_count(), 3);
        assert!(g.chip_at(Coord::new(1, 1)).is_none());
        assert_eq!(g.edge_count(), 6);
    }

    #[test]
    fn cut_off_slot_rejected() {
        // (2, 0) is isolated once (1, 0) and (2, 1) are excluded
        let grid = GridSpec::new(3, 2, Coord::new(0, 0), Coord::new(-1, 0))
            .with_avoid([Coord::new(1, 0), Coord::new(2, 1)]);
        let err = build_candidate_graph(&grid).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::UnreachableSlots { count: 1, first, .. } if first == Coord::new(2, 0)
        ));
        assert!(grid.validate().is_err());
    }

    #[test]
    fn walled_off_region_counted() {
        // a full column of exclusions splits x = 2..4 from the root side
        let grid = GridSpec::new(4, 3, Coord::new(0, 1), Coord::new(-1, 1))
            .with_avoid([Coord::new(1, 0), Coord::new(1, 1), Coord::new(1, 2)]);
        assert!(matches!(
            grid.validate(),
            Err(NetworkError::UnreachableSlots { count: 6, .. })
        ));
    }

    #[test]
    fn exclusions_outside_grid_ignored_by_reachability() {
        let grid = spec_2x2().with_avoid([Coord::new(7, 7), Coord::new(-3, 0)]);
        let g = build_candidate_graph(&grid).unwrap();
        assert_eq!(g.chip_count(), 4);
    }

    #[test]
    fn root_only_grid() {
        let grid = GridSpec::new(1, 1, Coord::new(0, 0), Coord::new(-1, 0));
        let g = build_candidate_graph(&grid).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn root_linked_to_distant_ext() {
        let grid = GridSpec::new(2, 2, Coord::new(1, 1), Coord::new(5, 5));
        let g = build_candidate_graph(&grid).unwrap();
        assert!(g.has_edge(g.root(), g.ext()));
        assert_eq!(g.in_degree(g.ext()), 1);
    }

    #[test]
    fn empty_grid_rejected() {
        let grid = GridSpec::new(0, 3, Coord::new(0, 0), Coord::new(-1, 0));
        assert!(matches!(
            build_candidate_graph(&grid),
            Err(NetworkError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn oversized_grid_rejected() {
        let grid = GridSpec::new(u32::MAX, 1, Coord::new(0, 0), Coord::new(-1, 0));
        assert!(matches!(
            grid.validate(),
            Err(NetworkError::GridTooLarge(u32::MAX))
        ));
    }

    #[test]
    fn root_outside_grid_rejected() {
        let grid = GridSpec::new(2, 2, Coord::new(2, 0), Coord::new(-1, 0));
        assert!(matches!(
            build_candidate_graph(&grid),
            Err(NetworkError::RootOutOfBounds { .. })
        ));
    }

    #[test]
    fn excluded_root_rejected() {
        let grid = spec_2x2().with_avoid([Coord::new(0, 0)]);
        assert!(matches!(
            build_candidate_graph(&grid),
            Err(NetworkError::RootExcluded(_))
        ));
    }

    #[test]
    fn ext_on_live_slot_rejected() {
        let grid = GridSpec::new(2, 2, Coord::new(0, 0), Coord::new(1, 0));
        assert!(matches!(
            build_candidate_graph(&grid),
            Err(NetworkError::ExtOverlapsGrid(_))
        ));
    }

    #[test]
    fn ext_on_excluded_slot_allowed() {
        let grid = GridSpec::new(2, 2, Coord::new(0, 0), Coord::new(1, 0))
            .with_avoid([Coord::new(1, 0)]);
        let g = build_candidate_graph(&grid).unwrap();
        assert_eq!(g.chip_count(), 3);
        let corner = g.chip_at(Coord::new(1, 1)).unwrap();
        assert!(g.has_edge(g.ext(), corner));
    }
}
