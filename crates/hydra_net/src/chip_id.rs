//! Chip id assignment.
//!
//! The emitter asks a [`ChipIdAssigner`] for the ids of all chips once the
//! tree is fixed. Any `Fn(&NetworkGraph, Coord) -> u8` closure works as an
//! assigner; [`ChipIdPolicy`] provides the built-in schemes.

use crate::error::NetworkError;
use crate::graph::NetworkGraph;
use hydra_common::{ChipId, Coord};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Chooses the raw id of the chip at a coordinate.
///
/// Returning a reserved value (0, 1 or 255) makes emission fail with
/// [`NetworkError::ReservedChipId`].
pub trait ChipIdAssigner {
    /// Returns the id for the chip at `coord` in `graph`.
    fn assign(&self, graph: &NetworkGraph, coord: Coord) -> u8;

    /// Returns the id of every chip in `graph`, keyed by coordinate.
    ///
    /// Calls [`assign`](Self::assign) once per chip unless overridden.
    fn assign_all(&self, graph: &NetworkGraph) -> HashMap<Coord, u8> {
        chip_coords(graph)
            .map(|coord| (coord, self.assign(graph, coord)))
            .collect()
    }
}

fn chip_coords(graph: &NetworkGraph) -> impl Iterator<Item = Coord> + '_ {
    graph
        .nodes()
        .iter()
        .filter(|n| graph.is_chip(n.id))
        .map(|n| n.coord)
}

impl<F> ChipIdAssigner for F
where
    F: Fn(&NetworkGraph, Coord) -> u8,
{
    fn assign(&self, graph: &NetworkGraph, coord: Coord) -> u8 {
        self(graph, coord)
    }
}

/// Built-in chip id schemes. All of them wrap every 253 values, so ids are
/// only unique on networks with fewer chips (or positions) than that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChipIdPolicy {
    /// `10 * x + y`, easy to read on grids up to 8 slots wide.
    #[default]
    Simple,
    /// Row-major index inside the rectangle bounding every chip.
    Position,
    /// Breadth-first order from the root.
    Head,
}

impl ChipIdPolicy {
    /// Every policy name accepted by [`ChipIdPolicy::from_str`].
    pub const NAMES: [&'static str; 3] = ["simple", "position", "head"];

    /// Returns the policy's name.
    pub fn name(&self) -> &'static str {
        match self {
            ChipIdPolicy::Simple => "simple",
            ChipIdPolicy::Position => "position",
            ChipIdPolicy::Head => "head",
        }
    }
}

fn wrap(index: i64) -> u8 {
    ChipId::from_index(index.rem_euclid(i64::from(ChipId::ASSIGNABLE)) as u64).as_raw()
}

/// Rectangle bounding every chip, for [`ChipIdPolicy::Position`].
struct Bounds {
    x_min: i64,
    y_min: i64,
    height: i64,
}

impl Bounds {
    fn new(coords: impl Iterator<Item = Coord>) -> Self {
        let (mut x_min, mut y_min, mut y_max) = (i64::MAX, i64::MAX, i64::MIN);
        for c in coords {
            x_min = x_min.min(i64::from(c.x));
            y_min = y_min.min(i64::from(c.y));
            y_max = y_max.max(i64::from(c.y));
        }
        Self {
            x_min,
            y_min,
            height: y_max - y_min + 1,
        }
    }

    fn id(&self, coord: Coord) -> u8 {
        wrap((i64::from(coord.x) - self.x_min) * self.height + (i64::from(coord.y) - self.y_min))
    }
}

/// Breadth-first rank of every chip, for [`ChipIdPolicy::Head`].
fn head_ranks(graph: &NetworkGraph) -> HashMap<Coord, u8> {
    graph
        .breadth_first()
        .into_iter()
        .filter(|&id| graph.is_chip(id))
        .enumerate()
        .map(|(index, id)| (graph.coord(id), wrap(index as i64)))
        .collect()
}

impl ChipIdAssigner for ChipIdPolicy {
    fn assign(&self, graph: &NetworkGraph, coord: Coord) -> u8 {
        match self {
            ChipIdPolicy::Simple => simple_id(coord),
            ChipIdPolicy::Position => {
                Bounds::new(chip_coords(graph).chain(std::iter::once(coord))).id(coord)
            }
            // chips off the tree fall back to the unassigned id
            ChipIdPolicy::Head => head_ranks(graph)
                .get(&coord)
                .copied()
                .unwrap_or(ChipId::UNASSIGNED),
        }
    }

    fn assign_all(&self, graph: &NetworkGraph) -> HashMap<Coord, u8> {
        match self {
            ChipIdPolicy::Simple => chip_coords(graph).map(|c| (c, simple_id(c))).collect(),
            ChipIdPolicy::Position => {
                let bounds = Bounds::new(chip_coords(graph));
                chip_coords(graph).map(|c| (c, bounds.id(c))).collect()
            }
            ChipIdPolicy::Head => {
                let mut ids = head_ranks(graph);
                for coord in chip_coords(graph) {
                    ids.entry(coord).or_insert(ChipId::UNASSIGNED);
                }
                ids
            }
        }
    }
}

fn simple_id(coord: Coord) -> u8 {
    wrap(i64::from(coord.x) * 10 + i64::from(coord.y))
}

impl fmt::Display for ChipIdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChipIdPolicy {
    type Err = NetworkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "simple" | "chip_id_simple" => Ok(ChipIdPolicy::Simple),
            "position" | "chip_id_position" => Ok(ChipIdPolicy::Position),
            "head" | "chip_id_head" => Ok(ChipIdPolicy::Head),
            other => Err(NetworkError::UnknownChipIdPolicy(other.to_string())),
        }
    }
}
