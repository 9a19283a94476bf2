// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The [Mem] represents the CPU's 4 KiB of memory
//!
//! Contains some handy utils for reading and writing, all of which
//! refuse to touch anything outside the address space.

use crate::error::{Error, Result};
use std::{
    fmt::{Display, Formatter},
    ops::Range,
};

/// Size of the address space, in bytes
pub const MEM_SIZE: usize = 0x1000;
/// Where the glyph table lives
pub const FONT_ADDR: u16 = 0x050;
/// Where programs are loaded, and where execution starts
pub const PROGRAM_ADDR: u16 = 0x200;

/// Bitmaps for the hexadecimal digits `0`..=`F`, 5 bytes apiece
pub const CHARSET: [u8; 0x50] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// Represents a named region in memory
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    /// Character ROM
    Charset,
    /// Program memory
    Program,
}

impl Region {
    /// The addresses spanned by this [Region]
    pub fn range(self) -> Range<usize> {
        match self {
            Region::Charset => FONT_ADDR as usize..FONT_ADDR as usize + CHARSET.len(),
            Region::Program => PROGRAM_ADDR as usize..MEM_SIZE,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Region::Charset => "Charset",
                Region::Program => "Program",
            }
        )
    }
}

/// 4 KiB of byte-addressed memory, with the glyph table preloaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mem {
    memory: [u8; MEM_SIZE],
}

impl Default for Mem {
    fn default() -> Self {
        let mut memory = [0; MEM_SIZE];
        memory[Region::Charset.range()].copy_from_slice(&CHARSET);
        Mem { memory }
    }
}

impl Mem {
    /// Constructs a new [Mem] with the glyph table in place
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mem = Mem::new();
    /// assert_eq!(Some(0xf0), mem.get(0x50));
    /// ```
    pub fn new() -> Self {
        Mem::default()
    }

    /// Gets the byte at `addr`, if it exists
    pub fn get(&self, addr: usize) -> Option<u8> {
        self.memory.get(addr).copied()
    }

    /// Reads the byte at `addr`
    pub fn read(&self, addr: usize) -> Result<u8> {
        self.get(addr).ok_or(Error::AddressOutOfRange {
            range: addr..addr + 1,
        })
    }

    /// Reads the big-endian word at `addr`
    pub fn read_word(&self, addr: usize) -> Result<u16> {
        let word = self.grab(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// Gets `len` bytes starting at `addr`
    pub fn grab(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let range = addr..addr + len;
        self.memory
            .get(range.clone())
            .ok_or(Error::AddressOutOfRange { range })
    }

    /// Gets `len` mutable bytes starting at `addr`
    pub fn grab_mut(&mut self, addr: usize, len: usize) -> Result<&mut [u8]> {
        let range = addr..addr + len;
        self.memory
            .get_mut(range.clone())
            .ok_or(Error::AddressOutOfRange { range })
    }

    /// Gets a slice of a named [Region] of memory
    pub fn get_region(&self, name: Region) -> &[u8] {
        &self.memory[name.range()]
    }

    /// Fills a [Region] with zeroes
    pub fn clear_region(&mut self, name: Region) -> &mut Self {
        self.memory[name.range()].fill(0);
        self
    }

    /// Loads data into the start of a named [Region]
    ///
    /// Returns [Error::RomTooLarge] without touching memory if the data doesn't fit.
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let mut mem = Mem::new();
    /// mem.load_region(Program, b"Hello, world!").unwrap();
    /// assert_eq!(&mem.get_region(Program)[..13], b"Hello, world!");
    /// // 3585 bytes won't fit between 0x200 and 0x1000
    /// assert!(mem.load_region(Program, &[0; 0xe01]).is_err());
    /// ```
    pub fn load_region(&mut self, name: Region, data: &[u8]) -> Result<&mut Self> {
        let region = &mut self.memory[name.range()];
        if data.len() > region.len() {
            return Err(Error::RomTooLarge {
                len: data.len(),
                max: region.len(),
            });
        }
        region[..data.len()].copy_from_slice(data);
        Ok(self)
    }
}

impl Display for Mem {
    /// Hexdumps the non-empty lines of memory
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use owo_colors::{OwoColorize, Style};
        let term = Style::new().bold().green();
        for (line, bytes) in self.memory.chunks(16).enumerate() {
            if bytes.iter().all(|&b| b == 0) {
                continue;
            }
            write!(f, "{:03x}{} ", (line * 16).style(term), ":".style(term))?;
            for (index, byte) in bytes.iter().enumerate() {
                write!(f, "{byte:02x}")?;
                match index {
                    7 => write!(f, "  ")?,
                    _ if index % 2 == 1 => write!(f, " ")?,
                    _ => (),
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
