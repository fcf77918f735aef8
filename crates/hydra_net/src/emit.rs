//! Topology emission.
//!
//! Turns a pruned tree into the three directed graphs a controller needs:
//! the upstream data network (the tree, parent to child), the downstream
//! network (its reversal) and the command network (their union). All three
//! share node indices, which follow the tree's [`NodeId`](crate::ids::NodeId)
//! order, so index 0 is the root and index 1 the external link.

use crate::chip_id::ChipIdAssigner;
use crate::error::NetworkError;
use crate::graph::{NetworkGraph, NodeKind};
use crate::ports;
use hydra_common::{ChipId, Coord};
use log::warn;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

/// A node of an emitted network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedNode {
    /// Grid position (or the external link's position).
    pub coord: Coord,
    /// Chip or external link.
    pub kind: NodeKind,
    /// Assigned id; `None` for the external link.
    pub chip_id: Option<ChipId>,
    /// Whether this is the chip wired to the external link.
    pub is_root: bool,
    /// Port facing the node's parent in the tree.
    pub parent_port: Option<u8>,
    /// Ports facing each child, keyed by port.
    pub child_ports: BTreeMap<u8, Coord>,
}

/// A directed link between two emitted nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Port on the link's source node.
    pub source_port: Option<u8>,
    /// Port on the link's target node.
    pub target_port: Option<u8>,
}

/// The emitted networks of one tree.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Data flowing toward the root: edges run parent to child, as claims.
    pub upstream: DiGraph<EmittedNode, Link>,
    /// The reversal of `upstream`.
    pub downstream: DiGraph<EmittedNode, Link>,
    /// The union of `upstream` and `downstream`.
    pub command: DiGraph<EmittedNode, Link>,
    root: NodeIndex,
    ext: NodeIndex,
}

impl Topology {
    /// Returns the root chip's index.
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Returns the external link's index.
    pub fn ext(&self) -> NodeIndex {
        self.ext
    }

    /// Returns the node at `index`.
    pub fn node(&self, index: NodeIndex) -> &EmittedNode {
        &self.upstream[index]
    }

    /// Returns the number of chips.
    pub fn chip_count(&self) -> usize {
        self.upstream
            .node_weights()
            .filter(|n| n.kind == NodeKind::Chip)
            .count()
    }

    /// Returns the children of `index` in the upstream network.
    pub fn children(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.upstream.neighbors_directed(index, Direction::Outgoing)
    }

    /// Returns the parent of `index` in the upstream network.
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.upstream
            .neighbors_directed(index, Direction::Incoming)
            .next()
    }

    /// Returns every node reachable from the root, breadth first.
    pub fn breadth_first(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.upstream.node_count());
        let mut bfs = Bfs::new(&self.upstream, self.root);
        while let Some(index) = bfs.next(&self.upstream) {
            order.push(index);
        }
        order
    }
}

/// Emits the networks of `tree`, asking `assigner` for every chip's id.
///
/// Fails if `tree` is not an arborescence or an assigned id is reserved.
/// Duplicate ids are allowed but logged.
pub fn emit(tree: &NetworkGraph, assigner: &dyn ChipIdAssigner) -> Result<Topology, NetworkError> {
    tree.validate_arborescence()?;

    let assigned = assigner.assign_all(tree);
    let mut seen_ids: HashMap<ChipId, Coord> = HashMap::new();
    let mut nodes = Vec::with_capacity(tree.node_count());
    for node in tree.nodes() {
        let chip_id = match node.kind {
            NodeKind::Ext => None,
            NodeKind::Chip => {
                let raw = assigned
                    .get(&node.coord)
                    .copied()
                    .unwrap_or(ChipId::UNASSIGNED);
                let id = ChipId::new(raw).map_err(|_| NetworkError::ReservedChipId {
                    coord: node.coord,
                    id: raw,
                })?;
                if let Some(other) = seen_ids.insert(id, node.coord) {
                    warn!("chip id {id} is shared by {other} and {}", node.coord);
                }
                Some(id)
            }
        };
        let parent_port = tree
            .parents(node.id)
            .next()
            .and_then(|parent| ports::parent_port(tree.coord(parent), node.coord));
        let child_ports = tree
            .children(node.id)
            .filter_map(|child| {
                let coord = tree.coord(child);
                ports::child_port(node.coord, coord).map(|port| (port, coord))
            })
            .collect();
        nodes.push(EmittedNode {
            coord: node.coord,
            kind: node.kind,
            chip_id,
            is_root: node.id == tree.root(),
            parent_port,
            child_ports,
        });
    }

    let mut upstream = DiGraph::with_capacity(nodes.len(), tree.edge_count());
    let mut downstream = DiGraph::with_capacity(nodes.len(), tree.edge_count());
    let mut command = DiGraph::with_capacity(nodes.len(), 2 * tree.edge_count());
    for node in nodes {
        upstream.add_node(node.clone());
        downstream.add_node(node.clone());
        command.add_node(node);
    }

    for edge in tree.edges() {
        let (parent, child) = (tree.coord(edge.parent), tree.coord(edge.child));
        let claim = Link {
            source_port: ports::child_port(parent, child),
            target_port: ports::parent_port(parent, child),
        };
        let reply = Link {
            source_port: claim.target_port,
            target_port: claim.source_port,
        };
        let (p, c) = (
            NodeIndex::new(edge.parent.index()),
            NodeIndex::new(edge.child.index()),
        );
        upstream.add_edge(p, c, claim);
        downstream.add_edge(c, p, reply);
        command.add_edge(p, c, claim);
        command.add_edge(c, p, reply);
    }

    Ok(Topology {
        upstream,
        downstream,
        command,
        root: NodeIndex::new(tree.root().index()),
        ext: NodeIndex::new(tree.ext().index()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_id::ChipIdPolicy;
    use crate::ids::NodeId;
    use petgraph::visit::EdgeRef;
    use std::cell::Cell;

    /// root (0, 0) -> (1, 0) -> (1, 1), root -> (0, 1), root -> ext (-1, 0).
    fn tree() -> NetworkGraph {
        let mut g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-1, 0));
        let right = g.add_chip(Coord::new(1, 0));
        let corner = g.add_chip(Coord::new(1, 1));
        let up = g.add_chip(Coord::new(0, 1));
        let (root, ext) = (g.root(), g.ext());
        g.add_edge(root, ext);
        g.add_edge(root, right);
        g.add_edge(right, corner);
        g.add_edge(root, up);
        g
    }

    #[test]
    fn root_ports_and_ids() {
        let topo = emit(&tree(), &ChipIdPolicy::Simple).unwrap();
        let root = topo.node(topo.root());
        assert!(root.is_root);
        assert_eq!(root.chip_id.map(ChipId::as_raw), Some(2));
        assert_eq!(root.parent_port, None);
        assert_eq!(
            root.child_ports,
            BTreeMap::from([
                (0, Coord::new(0, 1)),
                (1, Coord::new(-1, 0)),
                (3, Coord::new(1, 0)),
            ])
        );
        let ext = topo.node(topo.ext());
        assert_eq!(ext.chip_id, None);
        assert_eq!(ext.parent_port, Some(3));
    }

    #[test]
    fn child_faces_parent() {
        let topo = emit(&tree(), &ChipIdPolicy::Simple).unwrap();
        let corner = NodeIndex::new(3);
        assert_eq!(topo.node(corner).coord, Coord::new(1, 1));
        assert_eq!(topo.node(corner).parent_port, Some(2));
        assert_eq!(topo.parent(corner), Some(NodeIndex::new(2)));
        assert_eq!(topo.node(corner).chip_id.map(ChipId::as_raw), Some(13));
    }

    #[test]
    fn downstream_is_reversal_and_command_is_union() {
        let topo = emit(&tree(), &ChipIdPolicy::Head).unwrap();
        assert_eq!(topo.upstream.edge_count(), 4);
        assert_eq!(topo.downstream.edge_count(), 4);
        assert_eq!(topo.command.edge_count(), 8);
        for edge in topo.upstream.edge_references() {
            let (s, t) = (edge.source(), edge.target());
            let back = topo.downstream.find_edge(t, s).unwrap();
            assert_eq!(topo.downstream[back].source_port, edge.weight().target_port);
            assert!(topo.command.find_edge(s, t).is_some());
            assert!(topo.command.find_edge(t, s).is_some());
        }
    }

    #[test]
    fn distant_ext_link_has_no_ports() {
        let mut g = NetworkGraph::new(Coord::new(0, 0), Coord::new(-4, 0));
        let (root, ext) = (g.root(), g.ext());
        g.add_edge(root, ext);
        let topo = emit(&g, &ChipIdPolicy::Simple).unwrap();
        let link = topo.upstream.edge_weights().next().unwrap();
        assert_eq!(link.source_port, None);
        assert_eq!(link.target_port, None);
        assert!(topo.node(topo.root()).child_ports.is_empty());
    }

    #[test]
    fn reserved_id_rejected() {
        let broadcast = |_: &NetworkGraph, c: Coord| -> u8 {
            if c.x == 1 {
                255
            } else {
                7
            }
        };
        let err = emit(&tree(), &broadcast).unwrap_err();
        assert!(matches!(err, NetworkError::ReservedChipId { id: 255, .. }));
    }

    #[test]
    fn assigner_runs_once_per_emission() {
        struct Counting(Cell<usize>);
        impl ChipIdAssigner for Counting {
            fn assign(&self, _: &NetworkGraph, c: Coord) -> u8 {
                (c.x * 10 + c.y + 20) as u8
            }
            fn assign_all(&self, graph: &NetworkGraph) -> HashMap<Coord, u8> {
                self.0.set(self.0.get() + 1);
                graph
                    .nodes()
                    .iter()
                    .filter(|n| graph.is_chip(n.id))
                    .map(|n| (n.coord, self.assign(graph, n.coord)))
                    .collect()
            }
        }
        let counting = Counting(Cell::new(0));
        let topo = emit(&tree(), &counting).unwrap();
        assert_eq!(counting.0.get(), 1);
        assert_eq!(topo.node(topo.root()).chip_id.map(ChipId::as_raw), Some(20));
    }

    #[test]
    fn missing_assignment_is_reserved() {
        struct Empty;
        impl ChipIdAssigner for Empty {
            fn assign(&self, _: &NetworkGraph, _: Coord) -> u8 {
                9
            }
            fn assign_all(&self, _: &NetworkGraph) -> HashMap<Coord, u8> {
                HashMap::new()
            }
        }
        let err = emit(&tree(), &Empty).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::ReservedChipId { id: ChipId::UNASSIGNED, .. }
        ));
    }

    #[test]
    fn invalid_tree_rejected() {
        let mut g = tree();
        let (root, corner) = (g.root(), NodeId::from_raw(3));
        g.add_edge(root, corner);
        assert!(matches!(
            emit(&g, &ChipIdPolicy::Simple),
            Err(NetworkError::Internal(_))
        ));
    }

    #[test]
    fn breadth_first_from_root() {
        let topo = emit(&tree(), &ChipIdPolicy::Simple).unwrap();
        let order = topo.breadth_first();
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], topo.root());
        assert_eq!(topo.chip_count(), 4);
    }
}
