// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions

#[cfg(test)]
mod tests;

pub mod behavior;
pub mod flags;
pub mod instruction;
pub mod mem;
pub mod mode;
pub mod quirks;
pub mod stack;
pub mod timers;

use self::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Opcode,
    },
    mem::{Mem, Region::*, PROGRAM_ADDR},
    mode::Mode,
    quirks::Quirks,
    stack::Stack,
    timers::Timers,
};
use crate::{
    error::{Error, Result},
    screen::Screen,
};
use owo_colors::OwoColorize;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    fmt::Debug,
    time::{SystemTime, UNIX_EPOCH},
};

/// Index of a general purpose register
pub type Reg = usize;
/// A 12-bit (nominally) memory address
pub type Adr = u16;
/// A 4-bit operand
pub type Nib = u8;

/// Represents the internal state of the CPU interpreter
#[derive(Clone)]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to the
    /// chip-8. Includes [Quirks], lenient decoding, etc.
    pub flags: Flags,
    // memory
    mem: Mem,
    screen: Screen,
    stack: Stack,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    timers: Timers,
    // I/O
    keys: [bool; 16],
    // Execution data
    cycle: usize,
    rng: StdRng,
    disassembler: Dis,
}

// public interface
impl CPU {
    /// Constructs a new CPU, with its random number generator seeded from the system clock
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let cpu = CPU::new();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|time| time.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Constructs a new CPU which draws its random numbers from `rng`
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let cpu = CPU::with_rng(StdRng::seed_from_u64(0xc8));
    /// assert_eq!(0, cpu.i());
    /// ```
    pub fn with_rng(rng: StdRng) -> Self {
        CPU {
            flags: Flags::default(),
            mem: Mem::default(),
            screen: Screen::default(),
            stack: Stack::default(),
            pc: PROGRAM_ADDR,
            i: 0,
            v: [0; 16],
            timers: Timers::default(),
            keys: [false; 16],
            cycle: 0,
            rng,
            disassembler: Dis::default(),
        }
    }

    /// Constructs a new CPU with the [Quirks] preset for `mode`
    pub fn with_mode(mode: Mode) -> Self {
        let mut cpu = CPU::new();
        cpu.flags.quirks = Quirks::from(mode);
        cpu
    }

    /// Constructs a new CPU with the [Quirks] preset for `mode`,
    /// which draws its random numbers from `rng`
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let cpu = CPU::with_mode_and_rng(Mode::Cosmac, StdRng::seed_from_u64(0xc8));
    /// assert!(cpu.flags.quirks.shift_vy);
    /// ```
    pub fn with_mode_and_rng(mode: Mode, rng: StdRng) -> Self {
        let mut cpu = CPU::with_rng(rng);
        cpu.flags.quirks = Quirks::from(mode);
        cpu
    }

    /// Loads a program into the CPU's program space
    ///
    /// Returns [Error::LoadFailure] if the file can't be read,
    /// and [Error::RomTooLarge] if it doesn't fit.
    pub fn load_program(&mut self, rom: impl AsRef<std::path::Path>) -> Result<&mut Self> {
        let path = rom.as_ref();
        let rom = std::fs::read(path).map_err(|source| Error::LoadFailure {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_program_bytes(&rom)
    }

    /// Loads bytes into the CPU's program space
    ///
    /// Returns [Error::RomTooLarge], leaving memory untouched, if there are more than 3584 bytes.
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0x60, 0x05]).unwrap();
    /// assert_eq!(Some(0x60), cpu.mem().get(0x200));
    /// assert!(cpu.load_program_bytes(&[0; 0xe01]).is_err());
    /// ```
    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<&mut Self> {
        let max = Program.range().len();
        if rom.len() > max {
            return Err(Error::RomTooLarge {
                len: rom.len(),
                max,
            });
        }
        self.mem.clear_region(Program);
        self.mem.load_region(Program, rom)?;
        Ok(self)
    }

    /// Presses a key, and reports whether the key's state changed.
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    ///
    /// // press key `7`
    /// let did_press = cpu.press(0x7).unwrap();
    /// assert!(did_press);
    ///
    /// // press key `7` again, even though it's already pressed
    /// let did_press = cpu.press(0x7).unwrap();
    /// // it was already pressed, so nothing's changed.
    /// assert!(!did_press);
    /// ```
    pub fn press(&mut self, key: usize) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        let changed = !*keyref;
        *keyref = true;
        Ok(changed)
    }

    /// Releases a key, and reports whether the key's state changed.
    /// If key is outside range `0..=0xF`, returns [Error::InvalidKey].
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// // press key `7`
    /// cpu.press(0x7).unwrap();
    /// // release key `7`
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(changed); // key released
    /// // try releasing `7` again
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(!changed); // key was not held
    /// ```
    pub fn release(&mut self, key: usize) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        let changed = *keyref;
        *keyref = false;
        Ok(changed)
    }

    /// Overwrites the state of all 16 keys at once
    pub fn set_keys(&mut self, keys: &[bool; 16]) {
        self.keys = *keys;
    }

    /// Gets the state of all 16 keys
    pub fn keys(&self) -> &[bool; 16] {
        &self.keys
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// // Create a new CPU, and set v4 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// assert_eq!(0x41, cpu.v()[4]);
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        let gpr = self.v.get_mut(reg).ok_or(Error::InvalidRegister { reg })?;
        *gpr = value;
        Ok(())
    }

    /// Gets a slice of the entire general purpose registers
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x0, 0x41).unwrap();
    /// assert_eq!(
    ///     cpu.v(),
    ///     [0x41, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    /// )
    /// ```
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Gets the stack pointer
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    /// Gets the occupied part of the call stack, oldest first
    pub fn stack(&self) -> &[Adr] {
        self.stack.as_slice()
    }

    /// Gets the value in the Sound Timer register
    pub fn sound(&self) -> u8 {
        self.timers.sound
    }

    /// Gets the value in the Delay Timer register
    pub fn delay(&self) -> u8 {
        self.timers.delay
    }

    /// Returns true while the sound timer is running
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0x60, 0x02, 0xf0, 0x18]).unwrap();
    /// cpu.multistep(2).unwrap();
    /// assert!(cpu.beeping());
    /// cpu.tick_timers();
    /// assert!(!cpu.beeping());
    /// ```
    pub fn beeping(&self) -> bool {
        self.timers.beeping()
    }

    /// Gets the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Gets the memory
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Gets the number of instructions the CPU has executed
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0, cpu.cycles());
    /// ```
    pub fn cycles(&self) -> usize {
        self.cycle
    }

    /// Counts both timers down by one.
    ///
    /// [CPU::cycle] does this itself, unless [Flags::external_timers] is set.
    pub fn tick_timers(&mut self) -> &mut Self {
        self.timers.tick();
        self
    }

    /// Runs `steps` cycles, stopping at the first error
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.multistep(0x20)
    ///     .expect("The program should only have valid opcodes.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(0x20, cpu.cycles());
    /// ```
    pub fn multistep(&mut self, steps: usize) -> Result<&mut Self> {
        for _ in 0..steps {
            self.cycle()?;
        }
        Ok(self)
    }

    /// Executes a single instruction, then ticks the timers
    ///
    /// If the instruction faults, the CPU is left as it was before the fetch,
    /// and the error is returned.
    ///
    /// Returns [Error::UnimplementedOpcode] if the instruction at `pc` is unimplemented,
    /// unless [Flags::lenient] is set.
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.cycle()
    ///     .expect("0x00e0 (cls) should be a valid opcode.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycles());
    /// ```
    /// Returns [Error::UnimplementedOpcode] if the instruction is not implemented.
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0xff, 0xff, // invalid!
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// dbg!(cpu.cycle())
    ///     .expect_err("Should return Error::UnimplementedOpcode { 0xffff }");
    /// ```
    pub fn cycle(&mut self) -> Result<&mut Self> {
        // Do nothing if paused
        if self.flags.pause {
            return Ok(self);
        }
        // fetch opcode
        let pc = self.pc;
        let opcode = Opcode(self.mem.read_word(pc as usize)?);

        // Print opcode disassembly:
        if self.flags.debug {
            std::println!(
                "{:3} {:03x}: {:<36}",
                self.cycle.bright_black(),
                pc,
                self.disassembler.once(opcode.0)
            );
        }

        // decode opcode
        let insn = match opcode.decode() {
            Ok(insn) => Some(insn),
            Err(_) if self.flags.lenient => None,
            Err(e) => return Err(e),
        };
        self.pc = pc.wrapping_add(2);
        if let Some(insn) = insn {
            if let Err(e) = self.execute(insn) {
                self.pc = pc;
                return Err(e);
            }
        }

        self.cycle += 1;
        if !self.flags.external_timers {
            self.timers.tick();
        }
        Ok(self)
    }

    /// Dumps the current state of all CPU registers, and the cycle count
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.dump();
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP: 0000, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// ```
    pub fn dump(&self) {
        std::println!(
            "PC: {:04x}, SP: {:04x}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}",
            self.pc,
            self.stack.len(),
            self.i,
            self.v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.timers.delay,
            self.timers.sound,
            self.cycle,
        );
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("stack", &self.stack)
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("timers", &self.timers)
            .field("keys", &self.keys)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a new CPU with sane defaults
    ///
    /// | value  | default | description
    /// |--------|---------|------------
    /// | font   |`0x0050` | Location of font memory.
    /// | pc     |`0x0200` | Start location.
    ///
    /// # Examples
    /// ```rust
    /// use chip8_vm::*;
    /// let mut cpu = CPU::default();
    /// ```
    fn default() -> Self {
        CPU::new()
    }
}
