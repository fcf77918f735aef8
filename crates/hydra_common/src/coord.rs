//! Grid coordinates for chip slots and the external link.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed `(x, y)` position on the chip grid.
///
/// Grid slots occupy `0 <= x < width`, `0 <= y < height`; the external link
/// may sit anywhere, including outside the grid. Serialized as a two-element
/// array so configuration files can write `root = [0, 0]`. Ordering is
/// lexicographic on `(x, y)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// The four unit steps between 4-adjacent slots.
pub const UNIT_STEPS: [(i32, i32); 4] = [(0, 1), (1, 0), (-1, 0), (0, -1)];

impl Coord {
    /// Creates a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this coordinate shifted by `(dx, dy)`, or `None` on overflow.
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Returns the 4-adjacent coordinates that are representable.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        UNIT_STEPS
            .into_iter()
            .filter_map(move |(dx, dy)| self.checked_offset(dx, dy))
    }

    /// Returns `other - self` as `(dx, dy)`, widened so it cannot overflow.
    pub fn delta_to(self, other: Coord) -> (i64, i64) {
        (
            i64::from(other.x) - i64::from(self.x),
            i64::from(other.y) - i64::from(self.y),
        )
    }

    /// Returns whether `other` is one unit step away.
    pub fn is_adjacent(self, other: Coord) -> bool {
        let (dx, dy) = self.delta_to(other);
        dx.abs() + dy.abs() == 1
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
