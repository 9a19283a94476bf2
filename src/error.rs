// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for the interpreter

use std::{ops::Range, path::PathBuf};
use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the interpreter.
#[derive(Debug, Error)]
pub enum Error {
    /// The program doesn't fit between the load address and the end of memory
    #[error("rom of {len} bytes exceeds the {max} bytes of program memory")]
    RomTooLarge {
        /// Length of the offending rom
        len: usize,
        /// Space available for programs
        max: usize,
    },
    /// The rom file could not be read
    #[error("failed to load rom from {}", path.display())]
    LoadFailure {
        /// Path to the rom
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },
    /// A subroutine call was made with all 16 stack slots occupied
    #[error("stack overflow: call at {pc:03x} with a full stack")]
    StackOverflow {
        /// Address of the offending call
        pc: u16,
    },
    /// A return was made with nothing on the stack
    #[error("stack underflow: return at {pc:03x} with an empty stack")]
    StackUnderflow {
        /// Address of the offending return
        pc: u16,
    },
    /// Represents an unimplemented operation
    #[error("opcode {word:04x} not recognized")]
    UnimplementedOpcode {
        /// The offending word
        word: u16,
    },
    /// Tried to touch memory outside the 4 KiB address space
    #[error("range {range:03x?} is outside of memory")]
    AddressOutOfRange {
        /// The offending range
        range: Range<usize>,
    },
    /// Tried to press a key that doesn't exist
    #[error("tried to press key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Tried to convert string into mode, but it did not match.
    #[error("no suitable conversion of \"{mode}\" into Mode")]
    InvalidMode {
        /// The string which failed to become a mode
        mode: String,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
