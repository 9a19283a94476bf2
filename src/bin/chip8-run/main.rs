// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! A headless host for the interpreter.
//!
//! Runs a rom for a fixed number of cycles, holding down the requested keys,
//! then prints the screen and registers.

use chip8_vm::{Mode, Result, CPU};
use gumdrop::*;
use owo_colors::OwoColorize;
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

/// Timer frequency of the original hardware
const TIMER_RATE: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Parses a hexadecimal string into a usize
fn parse_hex(value: &str) -> std::result::Result<usize, std::num::ParseIntError> {
    usize::from_str_radix(value, 16)
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Load a ROM to run.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Print each instruction as it runs.")]
    pub debug: bool,
    #[options(help = "Skip unrecognized instructions instead of stopping.")]
    pub lenient: bool,
    #[options(help = "Run in (Modern, Cosmac) mode.")]
    pub mode: Option<Mode>,
    #[options(help = "Milliseconds to wait between cycles.", default = "1", meta = "MS")]
    pub delay: u64,
    #[options(help = "Number of cycles to run.", default = "1000", meta = "N")]
    pub cycles: usize,
    #[options(
        help = "Tick the timers at 60Hz, instead of once per cycle.",
        short = "r"
    )]
    pub realtime: bool,
    #[options(
        help = "Hold down a key (0-F) for the whole run.",
        parse(try_from_str = "parse_hex"),
        meta = "KEY"
    )]
    pub key: Vec<usize>,
}

fn main() -> Result<()> {
    let options = Arguments::parse_args_default_or_exit();
    let mut cpu = CPU::with_mode(options.mode.unwrap_or_default());
    cpu.flags.debug = options.debug;
    cpu.flags.lenient = options.lenient;
    cpu.flags.external_timers = options.realtime;
    cpu.load_program(&options.file)?;
    for &key in &options.key {
        cpu.press(key)?;
    }

    let delay = Duration::from_millis(options.delay);
    let mut timer = Instant::now();
    for _ in 0..options.cycles {
        let start = Instant::now();
        if let Err(e) = cpu.cycle() {
            eprintln!("{}", e.bold().red());
            break;
        }
        if options.realtime {
            while timer.elapsed() >= TIMER_RATE {
                cpu.tick_timers();
                timer += TIMER_RATE;
            }
        }
        std::thread::sleep(delay.saturating_sub(start.elapsed()));
    }

    cpu.screen().print();
    cpu.dump();
    Ok(())
}
