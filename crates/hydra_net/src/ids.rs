//! Node identifiers.
//!
//! [`NodeId`] is a dense index into the node arrays of a
//! [`NetworkGraph`](crate::graph::NetworkGraph). Ids are handed out in
//! insertion order, so the root is always 0 and the external link 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Copyable index of a node (chip slot or external link) in a network graph.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Wraps a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the index for slicing node arrays.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}
