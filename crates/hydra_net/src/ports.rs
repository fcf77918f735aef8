//! Uart port numbering.
//!
//! Every chip has four uarts, one per grid direction. The port a chip uses
//! for a link is fixed by the direction from the chip to its neighbor:
//!
//! | step `(dx, dy)` | port |
//! |-----------------|------|
//! | `(0, 1)`        | 0    |
//! | `(-1, 0)`       | 1    |
//! | `(0, -1)`       | 2    |
//! | `(1, 0)`        | 3    |
//!
//! [`UartMaps`] is a separate naming layer that maps ports to the slots of
//! a controller configuration's `miso_us`, `miso_ds` and `mosi` arrays.

use hydra_common::Coord;
use serde::{Deserialize, Serialize};

/// Number of uarts on a chip.
pub const PORT_COUNT: usize = 4;

/// Returns the port used to reach a neighbor one `(dx, dy)` step away.
///
/// Non-unit steps, such as a root linked to a distant external link, have
/// no port.
pub fn port_for_step(dx: i64, dy: i64) -> Option<u8> {
    match (dx, dy) {
        (0, 1) => Some(0),
        (-1, 0) => Some(1),
        (0, -1) => Some(2),
        (1, 0) => Some(3),
        _ => None,
    }
}

/// Returns the port `parent` uses to talk to `child`.
pub fn child_port(parent: Coord, child: Coord) -> Option<u8> {
    let (dx, dy) = parent.delta_to(child);
    port_for_step(dx, dy)
}

/// Returns the port `child` uses to talk to `parent`.
pub fn parent_port(parent: Coord, child: Coord) -> Option<u8> {
    let (dx, dy) = child.delta_to(parent);
    port_for_step(dx, dy)
}

/// Per-deployment mapping from ports to configuration array slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UartMaps {
    /// Upstream receive uart per `miso_us` slot.
    pub miso_us: [u8; PORT_COUNT],
    /// Downstream receive uart per `miso_ds` slot.
    pub miso_ds: [u8; PORT_COUNT],
    /// Command uart per `mosi` slot.
    pub mosi: [u8; PORT_COUNT],
}

impl Default for UartMaps {
    fn default() -> Self {
        Self {
            miso_us: [0, 1, 2, 3],
            miso_ds: [2, 3, 0, 1],
            mosi: [0, 1, 2, 3],
        }
    }
}

impl UartMaps {
    /// Returns the `miso_us` slot wired to `port`.
    pub fn miso_us_slot(&self, port: u8) -> Option<usize> {
        self.miso_us.iter().position(|&p| p == port)
    }

    /// Returns the `miso_ds` slot wired to `port`.
    pub fn miso_ds_slot(&self, port: u8) -> Option<usize> {
        self.miso_ds.iter().position(|&p| p == port)
    }

    /// Returns the `mosi` slot wired to `port`.
    pub fn mosi_slot(&self, port: u8) -> Option<usize> {
        self.mosi.iter().position(|&p| p == port)
    }
}
