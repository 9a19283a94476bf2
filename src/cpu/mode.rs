// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Selects the quirk preset of the [super::CPU]

use crate::error::Error;
use std::str::FromStr;

/// Selects a preset of [super::Quirks]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// Modern interpreter behavior
    #[default]
    Modern,
    /// Cosmac VIP emulation mode
    Cosmac,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "modern" | "chip8" | "chip-8" => Ok(Mode::Modern),
            "cosmac" | "vip" | "cosmac-vip" => Ok(Mode::Cosmac),
            _ => Err(Error::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}
