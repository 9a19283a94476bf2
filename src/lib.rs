// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

#![warn(missing_docs)]
//! This crate implements a Chip-8 interpreter as if it were a real CPU architecture.
//!
//! The [CPU] owns everything the interpreter touches: memory, registers, timers,
//! the keypad and the [Screen]. A host loads a rom, then calls [CPU::cycle] at
//! whatever rate it likes, writing keys before and reading the screen after.
//!
//! ```rust
//! # use chip8_vm::*;
//! # fn main() -> Result<()> {
//! let mut cpu = CPU::default();
//! cpu.load_program_bytes(&[
//!     0x60, 0x05, // mov #05, v0
//!     0x70, 0x05, // add #05, v0
//! ])?;
//! cpu.multistep(2)?;
//! assert_eq!(10, cpu.v()[0]);
//! # Ok(())
//! # }
//! ```

pub mod cpu;
pub mod error;
pub mod screen;

// Common imports for chip8_vm
pub use cpu::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn, Opcode,
    },
    mem::{Mem, Region::*},
    mode::Mode,
    quirks::Quirks,
    CPU,
};
pub use error::{Error, Result};
pub use screen::Screen;
