//! Error types for network generation.

use hydra_common::{Coord, InternalError};

/// Errors that can occur while building or emitting a network.
///
/// Everything except [`NetworkError::Internal`] is detected before any
/// search begins or while assigning chip ids, and points at a problem in the
/// caller's inputs.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The grid has no slots in at least one dimension.
    #[error("grid must have at least one slot in each dimension (got {width}x{height})")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A grid dimension cannot be addressed with signed 32-bit coordinates.
    #[error("grid dimension {0} exceeds the coordinate range")]
    GridTooLarge(u32),

    /// The root coordinate is not a grid slot.
    #[error("root {root} lies outside the {width}x{height} grid")]
    RootOutOfBounds {
        /// Requested root.
        root: Coord,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// The root coordinate is in the exclusion set.
    #[error("root {0} is in the exclusion set")]
    RootExcluded(Coord),

    /// The external link sits on a live grid slot.
    #[error("external link {0} overlaps a grid slot")]
    ExtOverlapsGrid(Coord),

    /// Exclusions cut live slots off from the root, so no tree can span
    /// every chip.
    #[error("{count} slot(s), first {first}, are cut off from root {root} by exclusions")]
    UnreachableSlots {
        /// Number of live slots with no path to the root.
        count: u64,
        /// The first of them in row-major order.
        first: Coord,
        /// The root they cannot reach.
        root: Coord,
    },

    /// No pruning strategy has the requested name.
    #[error("unknown pruning strategy '{0}'")]
    UnknownStrategy(String),

    /// No chip id policy has the requested name.
    #[error("unknown chip id policy '{0}'")]
    UnknownChipIdPolicy(String),

    /// A chip id assigner returned a reserved value.
    #[error("chip at {coord} was assigned reserved id {id}")]
    ReservedChipId {
        /// The chip's position.
        coord: Coord,
        /// The rejected id.
        id: u8,
    },

    /// The generator produced an invalid network (a bug).
    #[error(transparent)]
    Internal(#[from] InternalError),
}
