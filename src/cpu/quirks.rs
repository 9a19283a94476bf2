// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Controls the [Quirks] behavior of the CPU on a granular level.

use super::Mode;

/// Controls the quirk behavior of the CPU on a granular level.
///
/// `false` is the modern behavior; `true` opts in to what the Cosmac VIP interpreter did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quirks {
    /// Cosmac VIP: Binary ops in `8xy`(`1`, `2`, `3`) set vF to 0
    pub vf_reset: bool,
    /// Cosmac VIP: Shift ops in `8xy`(`6`, `E`) shift vY into vX
    pub shift_vy: bool,
    /// Cosmac VIP: DMA instructions `Fx55`/`Fx65` leave I at I + x + 1
    pub dma_inc: bool,
    /// Sprite pixels wrap from side to side and bottom to top, rather than clipping
    pub sprite_wrap: bool,
}

impl From<bool> for Quirks {
    fn from(value: bool) -> Self {
        Quirks {
            vf_reset: value,
            shift_vy: value,
            dma_inc: value,
            sprite_wrap: false,
        }
    }
}

impl From<Mode> for Quirks {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Modern => Quirks::from(false),
            Mode::Cosmac => Quirks::from(true),
        }
    }
}
