// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The delay and sound timers

/// Two independent countdown timers
///
/// Both count toward zero once per [Timers::tick], and stay there until rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Timers {
    /// Delay timer, readable by programs
    pub delay: u8,
    /// Sound timer; a tone plays while it's nonzero
    pub sound: u8,
}

impl Timers {
    /// Counts both timers down by one, if they're above zero
    /// # Examples
    /// ```rust
    /// # use chip8_vm::cpu::timers::Timers;
    /// let mut timers = Timers { delay: 1, sound: 0 };
    /// timers.tick();
    /// timers.tick();
    /// assert_eq!(Timers { delay: 0, sound: 0 }, timers);
    /// ```
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Returns true while the sound timer is running
    pub fn beeping(&self) -> bool {
        self.sound > 0
    }
}
