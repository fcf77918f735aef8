//! Shared foundational types for the Hydra network generator.
//!
//! This crate provides grid coordinates, chip identifiers with their reserved
//! values, and the common internal result type.

#![warn(missing_docs)]

pub mod chip_id;
pub mod coord;
pub mod result;

pub use chip_id::{ChipId, ReservedChipIdError};
pub use coord::Coord;
pub use result::{HydraResult, InternalError};
