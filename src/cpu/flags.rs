// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Represents flags that aid in implementation but aren't a part of the Chip-8 itself

use super::Quirks;

/// Represents flags that aid in operation, but aren't inherent to the CPU
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flags {
    /// Set when debug (live disassembly) mode enabled
    pub debug: bool,
    /// Set when the emulator is paused by the user and should not update
    pub pause: bool,
    /// Set when unrecognized opcodes should be skipped instead of reported
    pub lenient: bool,
    /// Set when the host ticks the timers itself, with [super::CPU::tick_timers]
    pub external_timers: bool,
    /// Represents the set of emulator [Quirks] to enable
    pub quirks: Quirks,
}

impl Flags {
    /// Toggles debug mode
    ///
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(false, cpu.flags.debug);
    /// // Toggle debug mode
    /// cpu.flags.debug();
    /// assert_eq!(true, cpu.flags.debug);
    /// ```
    pub fn debug(&mut self) {
        self.debug = !self.debug
    }

    /// Toggles pause
    ///
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(false, cpu.flags.pause);
    /// // Pause the cpu
    /// cpu.flags.pause();
    /// assert_eq!(true, cpu.flags.pause);
    /// ```
    pub fn pause(&mut self) {
        self.pause = !self.pause
    }
}
