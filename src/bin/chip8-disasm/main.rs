// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Disassembles a Chip-8 rom, one word per line

use chip8_vm::{Dis, Disassembler, Opcode, Result};
use gumdrop::*;
use owo_colors::OwoColorize;
use std::{fs::read, path::PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Show help text")]
    help: bool,
    #[options(help = "Disassemble a ROM", free, required)]
    pub file: PathBuf,
    #[options(help = "Start disassembling at offset...")]
    pub offset: usize,
}

fn main() -> Result<()> {
    let options = Arguments::parse_args_default_or_exit();
    let contents = &read(&options.file)?;
    let disassembler = Dis::default();
    for (addr, insn) in contents
        .get(options.offset..)
        .unwrap_or_default()
        .chunks_exact(2)
        .enumerate()
    {
        let insn = Opcode::from([insn[0], insn[1]]);
        println!(
            "{}",
            format_args!(
                "{:03x}: {} {:04x}",
                2 * addr + 0x200 + options.offset,
                disassembler.once(insn.0),
                insn.0.bright_black(),
            )
        );
    }
    Ok(())
}
