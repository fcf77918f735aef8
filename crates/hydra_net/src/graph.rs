//! Directed network graph with per-node caches.
//!
//! A [`NetworkGraph`] holds the chip nodes of one grid, the external link
//! node, and a set of directed `(parent, child)` claims. The same structure
//! represents the candidate graph (every adjacency in both directions), the
//! partially pruned graphs produced during search, and the final tree.
//!
//! Descendant counts and FIFO loads are cached per node. Every edge mutation
//! clears the caches of the edge's parent and of every node that can reach
//! that parent, since those are exactly the nodes whose reachable set changed.

use crate::ids::NodeId;
use hydra_common::{Coord, HydraResult, InternalError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// What occupies a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// An addressable chip in a grid slot.
    Chip,
    /// The external readout system. Never a data source.
    Ext,
}

/// A node of the network graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Dense index of this node.
    pub id: NodeId,
    /// Position used for adjacency and port lookup.
    pub coord: Coord,
    /// Chip or external link.
    pub kind: NodeKind,
}

/// A directed claim that `child` forwards its data to `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// The node receiving data.
    pub parent: NodeId,
    /// The node sending data.
    pub child: NodeId,
}

impl Edge {
    /// Creates an edge.
    pub fn new(parent: NodeId, child: NodeId) -> Self {
        Self { parent, child }
    }

    /// Returns the edge pointing the other way.
    pub fn reversed(self) -> Self {
        Self::new(self.child, self.parent)
    }
}

/// The grid network: nodes, directed edges and cached load data.
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) chip_by_coord: HashMap<Coord, NodeId>,
    pub(crate) root: NodeId,
    pub(crate) ext: NodeId,
    pub(crate) parents: Vec<BTreeSet<NodeId>>,
    pub(crate) children: Vec<BTreeSet<NodeId>>,
    pub(crate) descendants: Vec<Option<u64>>,
    pub(crate) loads: Vec<Option<u64>>,
}

impl NetworkGraph {
    /// Creates a graph holding only the root chip and the external link.
    ///
    /// The root is node 0 and the external link node 1. No edges are added.
    pub fn new(root: Coord, ext: Coord) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            chip_by_coord: HashMap::new(),
            root: NodeId::from_raw(0),
            ext: NodeId::from_raw(1),
            parents: Vec::new(),
            children: Vec::new(),
            descendants: Vec::new(),
            loads: Vec::new(),
        };
        graph.push_node(root, NodeKind::Chip);
        graph.push_node(ext, NodeKind::Ext);
        graph
    }

    fn push_node(&mut self, coord: Coord, kind: NodeKind) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node { id, coord, kind });
        if kind == NodeKind::Chip {
            self.chip_by_coord.insert(coord, id);
        }
        self.parents.push(BTreeSet::new());
        self.children.push(BTreeSet::new());
        self.descendants.push(None);
        self.loads.push(None);
        id
    }

    /// Adds a chip at `coord` and returns its ID.
    ///
    /// Returns the existing ID if a chip already occupies `coord`.
    pub fn add_chip(&mut self, coord: Coord) -> NodeId {
        if let Some(&id) = self.chip_by_coord.get(&coord) {
            return id;
        }
        self.push_node(coord, NodeKind::Chip)
    }

    /// Returns the root chip.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the external link node.
    pub fn ext(&self) -> NodeId {
        self.ext
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns all nodes in ID order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the number of nodes, including the external link.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of chip nodes.
    pub fn chip_count(&self) -> usize {
        self.chip_by_coord.len()
    }

    /// Returns whether `id` is a chip (not the external link).
    pub fn is_chip(&self, id: NodeId) -> bool {
        self.nodes[id.index()].kind == NodeKind::Chip
    }

    /// Returns the chip at `coord`, if any.
    pub fn chip_at(&self, coord: Coord) -> Option<NodeId> {
        self.chip_by_coord.get(&coord).copied()
    }

    /// Returns the coordinate of a node.
    pub fn coord(&self, id: NodeId) -> Coord {
        self.nodes[id.index()].coord
    }

    /// Adds `parent -> child`. Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.children[parent.index()].insert(child) {
            return false;
        }
        self.parents[child.index()].insert(parent);
        self.invalidate_from(parent);
        true
    }

    /// Removes `parent -> child`. Returns `false` if the edge did not exist.
    pub fn remove_edge(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.children[parent.index()].remove(&child) {
            return false;
        }
        self.parents[child.index()].remove(&parent);
        self.invalidate_from(parent);
        true
    }

    /// Returns whether `parent -> child` exists.
    pub fn has_edge(&self, parent: NodeId, child: NodeId) -> bool {
        self.children[parent.index()].contains(&child)
    }

    /// Returns the nodes claiming `id` as their child, in ID order.
    pub fn parents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.parents[id.index()].iter().copied()
    }

    /// Returns the nodes `id` claims as children, in ID order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children[id.index()].iter().copied()
    }

    /// Returns the number of parents claiming `id`.
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.parents[id.index()].len()
    }

    /// Returns the number of children of `id`.
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.children[id.index()].len()
    }

    /// Returns every edge, ordered by parent then child.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.children.iter().enumerate().flat_map(|(p, kids)| {
            let parent = NodeId::from_raw(p as u32);
            kids.iter().map(move |&child| Edge::new(parent, child))
        })
    }

    /// Returns every edge as an ordered list.
    pub fn edge_list(&self) -> Vec<Edge> {
        self.edges().collect()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.children.iter().map(BTreeSet::len).sum()
    }

    /// Returns the nodes with more than one parent.
    pub fn redundant_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .map(|n| n.id)
            .filter(|&id| self.in_degree(id) > 1)
            .collect()
    }

    /// Returns every edge into a node with more than one parent.
    pub fn redundant_edges(&self) -> Vec<Edge> {
        self.redundant_nodes()
            .into_iter()
            .flat_map(|child| self.parents(child).map(move |parent| Edge::new(parent, child)))
            .collect()
    }

    /// Returns the number of chips reachable from `id`, excluding `id` itself.
    ///
    /// Counts reachability, so a node with several parents is counted once.
    /// The result is cached until an edge below `id` changes.
    pub fn descendants(&mut self, id: NodeId) -> u64 {
        if let Some(count) = self.descendants[id.index()] {
            return count;
        }
        let mut seen = vec![false; self.nodes.len()];
        seen[id.index()] = true;
        let mut stack = vec![id];
        let mut count = 0;
        while let Some(node) = stack.pop() {
            for &child in &self.children[node.index()] {
                if seen[child.index()] {
                    continue;
                }
                seen[child.index()] = true;
                if self.nodes[child.index()].kind == NodeKind::Chip {
                    count += 1;
                }
                stack.push(child);
            }
        }
        self.descendants[id.index()] = Some(count);
        count
    }

    /// Returns whether the descendant count of `id` is cached.
    pub fn is_descendants_cached(&self, id: NodeId) -> bool {
        self.descendants[id.index()].is_some()
    }

    /// Returns whether the FIFO load of `id` is cached.
    pub fn is_load_cached(&self, id: NodeId) -> bool {
        self.loads[id.index()].is_some()
    }

    /// Clears the caches of `start` and of every node that can reach it.
    fn invalidate_from(&mut self, start: NodeId) {
        let mut seen = vec![false; self.nodes.len()];
        seen[start.index()] = true;
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            self.descendants[node.index()] = None;
            self.loads[node.index()] = None;
            for &parent in &self.parents[node.index()] {
                if !seen[parent.index()] {
                    seen[parent.index()] = true;
                    stack.push(parent);
                }
            }
        }
    }

    /// Returns the nodes reachable from the root in breadth-first order.
    ///
    /// Children are visited in ID order, so the order is deterministic.
    pub fn breadth_first(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        seen[self.root.index()] = true;
        let mut order = vec![self.root];
        let mut queue = VecDeque::from([self.root]);
        while let Some(node) = queue.pop_front() {
            for child in self.children(node) {
                if !seen[child.index()] {
                    seen[child.index()] = true;
                    order.push(child);
                    queue.push_back(child);
                }
            }
        }
        order
    }

    /// Checks that the edges form an arborescence rooted at the root.
    ///
    /// The root must have no parent, every other node exactly one, the
    /// external link must hang off the root as a leaf, and every node must be
    /// reachable from the root.
    pub fn validate_arborescence(&self) -> HydraResult<()> {
        if self.in_degree(self.root) != 0 {
            return Err(InternalError::new(format!(
                "root {} has {} parents",
                self.coord(self.root),
                self.in_degree(self.root)
            )));
        }
        for node in &self.nodes {
            if node.id == self.root {
                continue;
            }
            let parents = self.in_degree(node.id);
            if parents != 1 {
                return Err(InternalError::new(format!(
                    "node {} has {parents} parents",
                    node.coord
                )));
            }
        }
        if !self.has_edge(self.root, self.ext) || self.out_degree(self.ext) != 0 {
            return Err(InternalError::new(
                "external link is not a leaf of the root".to_string(),
            ));
        }
        let reached = self.breadth_first().len();
        if reached != self.nodes.len() {
            return Err(InternalError::new(format!(
                "{} of {} nodes are unreachable from the root",
                self.nodes.len() - reached,
                self.nodes.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root (0,0) -> a (1,0) -> b (2,0), root -> ext (-1,0).
    fn chain() -> (NetworkGraph, NodeId, NodeId) {
        let mut g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-1, 0));
        let a = g.add_chip(Coord::new(1, 0));
        let b = g.add_chip(Coord::new(2, 0));
        g.add_edge(g.root(), g.ext());
        g.add_edge(g.root(), a);
        g.add_edge(a, b);
        (g, a, b)
    }

    #[test]
    fn new_graph_has_root_and_ext() {
        let g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-1, 0));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.chip_count(), 1);
        assert!(g.is_chip(g.root()));
        assert!(!g.is_chip(g.ext()));
        assert_eq!(g.chip_at(Coord::new(0, 0)), Some(g.root()));
        assert_eq!(g.chip_at(Coord::new(-1, 0)), None);
    }

    #[test]
    fn add_chip_is_idempotent() {
        let mut g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-1, 0));
        let a = g.add_chip(Coord::new(1, 0));
        assert_eq!(g.add_chip(Coord::new(1, 0)), a);
        assert_eq!(g.chip_count(), 2);
    }

    #[test]
    fn edge_add_remove() {
        let (mut g, a, b) = chain();
        assert!(g.has_edge(a, b));
        assert!(!g.add_edge(a, b));
        assert!(g.remove_edge(a, b));
        assert!(!g.remove_edge(a, b));
        assert_eq!(g.in_degree(b), 0);
        assert_eq!(g.out_degree(a), 0);
    }

    #[test]
    fn edges_are_ordered() {
        let (g, a, b) = chain();
        let edges = g.edge_list();
        assert_eq!(
            edges,
            vec![
                Edge::new(g.root(), g.ext()),
                Edge::new(g.root(), a),
                Edge::new(a, b)
            ]
        );
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn descendants_skip_ext() {
        let (mut g, a, b) = chain();
        let root = g.root();
        assert_eq!(g.descendants(root), 2);
        assert_eq!(g.descendants(a), 1);
        assert_eq!(g.descendants(b), 0);
    }

    #[test]
    fn descendants_count_shared_child_once() {
        let mut g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-1, 0));
        let a = g.add_chip(Coord::new(1, 0));
        let b = g.add_chip(Coord::new(0, 1));
        let c = g.add_chip(Coord::new(1, 1));
        let root = g.root();
        g.add_edge(root, a);
        g.add_edge(root, b);
        g.add_edge(a, c);
        g.add_edge(b, c);
        assert_eq!(g.descendants(root), 3);
        assert_eq!(g.redundant_nodes(), vec![c]);
        assert_eq!(g.redundant_edges(), vec![Edge::new(a, c), Edge::new(b, c)]);
    }

    #[test]
    fn mutation_invalidates_only_ancestors() {
        let mut g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-1, 0));
        let root = g.root();
        let a = g.add_chip(Coord::new(1, 0));
        let a2 = g.add_chip(Coord::new(2, 0));
        let b = g.add_chip(Coord::new(0, 1));
        let b2 = g.add_chip(Coord::new(0, 2));
        g.add_edge(root, a);
        g.add_edge(a, a2);
        g.add_edge(root, b);
        g.add_edge(b, b2);
        for id in [root, a, a2, b, b2] {
            g.descendants(id);
        }
        g.remove_edge(a, a2);
        assert!(!g.is_descendants_cached(a));
        assert!(!g.is_descendants_cached(root));
        assert!(g.is_descendants_cached(a2));
        assert!(g.is_descendants_cached(b));
        assert!(g.is_descendants_cached(b2));
    }

    #[test]
    fn breadth_first_order() {
        let (g, a, b) = chain();
        assert_eq!(g.breadth_first(), vec![g.root(), g.ext(), a, b]);
    }

    #[test]
    fn valid_tree_passes() {
        let (g, _, _) = chain();
        assert!(g.validate_arborescence().is_ok());
    }

    #[test]
    fn two_parents_fail_validation() {
        let (mut g, _, b) = chain();
        let root = g.root();
        g.add_edge(root, b);
        let err = g.validate_arborescence().unwrap_err();
        assert!(err.message.contains("2 parents"), "{err}");
    }

    #[test]
    fn detached_cycle_fails_validation() {
        let (mut g, a, b) = chain();
        let root = g.root();
        g.remove_edge(root, a);
        g.add_edge(b, a);
        let err = g.validate_arborescence().unwrap_err();
        assert!(err.message.contains("unreachable"), "{err}");
    }

    #[test]
    fn root_with_parent_fails_validation() {
        let (mut g, a, _) = chain();
        let root = g.root();
        g.add_edge(a, root);
        assert!(g.validate_arborescence().is_err());
    }
}
