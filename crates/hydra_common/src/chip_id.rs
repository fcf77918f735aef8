//! Chip identifiers and their reserved values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit chip identifier written into a chip's configuration register.
///
/// Three values carry protocol meaning and are never assigned to a chip:
/// [`ChipId::INVALID`], [`ChipId::UNASSIGNED`] and [`ChipId::BROADCAST`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChipId(u8);

/// Error returned when a reserved value is used as a chip id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("chip id {0} is reserved")]
pub struct ReservedChipIdError(pub u8);

impl ChipId {
    /// Marks an error or uninitialized register.
    pub const INVALID: u8 = 0;
    /// The id every chip comes up with after reset.
    pub const UNASSIGNED: u8 = 1;
    /// Addresses every chip on a link.
    pub const BROADCAST: u8 = 255;
    /// Number of assignable ids (`2..=254`).
    pub const ASSIGNABLE: u32 = 253;

    /// Creates a chip id, rejecting reserved values.
    pub fn new(raw: u8) -> Result<Self, ReservedChipIdError> {
        if Self::is_reserved(raw) {
            Err(ReservedChipIdError(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// Maps any index onto the assignable range, wrapping every 253 values.
    pub fn from_index(index: u64) -> Self {
        Self((index % u64::from(Self::ASSIGNABLE)) as u8 + 2)
    }

    /// Returns whether `raw` is one of the reserved values.
    pub fn is_reserved(raw: u8) -> bool {
        matches!(raw, Self::INVALID | Self::UNASSIGNED | Self::BROADCAST)
    }

    /// Returns the raw register value.
    pub fn as_raw(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ChipId {
    type Error = ReservedChipIdError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ChipId> for u8 {
    fn from(id: ChipId) -> Self {
        id.0
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChipId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_values_rejected() {
        assert_eq!(ChipId::new(0), Err(ReservedChipIdError(0)));
        assert_eq!(ChipId::new(1), Err(ReservedChipIdError(1)));
        assert_eq!(ChipId::new(255), Err(ReservedChipIdError(255)));
        assert_eq!(ChipId::new(2).unwrap().as_raw(), 2);
        assert_eq!(ChipId::new(254).unwrap().as_raw(), 254);
    }

    #[test]
    fn from_index_wraps_inside_assignable_range() {
        assert_eq!(ChipId::from_index(0).as_raw(), 2);
        assert_eq!(ChipId::from_index(252).as_raw(), 254);
        assert_eq!(ChipId::from_index(253).as_raw(), 2);
        for i in 0..1000 {
            assert!(!ChipId::is_reserved(ChipId::from_index(i).as_raw()));
        }
    }

    #[test]
    fn serde_rejects_reserved() {
        assert!(serde_json::from_str::<ChipId>("255").is_err());
        let id: ChipId = serde_json::from_str("12").unwrap();
        assert_eq!(id.as_raw(), 12);
        assert_eq!(serde_json::to_string(&id).unwrap(), "12");
    }

    #[test]
    fn display_error() {
        assert_eq!(format!("{}", ReservedChipIdError(1)), "chip id 1 is reserved");
    }
}
