// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Stores and displays the Chip-8's 64x32 monochrome screen

use std::fmt::{Display, Formatter, Result};

/// Width of the screen, in pixels
pub const WIDTH: usize = 64;
/// Height of the screen, in pixels
pub const HEIGHT: usize = 32;

/// A 64x32 grid of pixels, each either fully on or fully off
///
/// Pixels are stored row-major, with a row stride of [WIDTH].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pixels: [bool; WIDTH * HEIGHT],
}

impl Default for Screen {
    fn default() -> Self {
        Screen {
            pixels: [false; WIDTH * HEIGHT],
        }
    }
}

impl Screen {
    /// Constructs a blank screen
    pub fn new() -> Self {
        Screen::default()
    }

    /// Turns every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Gets the pixel at (`x`, `y`), or [None] if that's off-screen
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let screen = Screen::new();
    /// assert_eq!(Some(false), screen.get(63, 31));
    /// assert_eq!(None, screen.get(64, 0));
    /// ```
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x < WIDTH && y < HEIGHT {
            Some(self.pixels[y * WIDTH + x])
        } else {
            None
        }
    }

    /// Flips the pixel at (`x`, `y`), returning whether it was on beforehand.
    ///
    /// Returns [None], and does nothing, if (`x`, `y`) is off-screen.
    pub fn flip(&mut self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        let pixel = &mut self.pixels[y * WIDTH + x];
        let was_on = *pixel;
        *pixel ^= true;
        Some(was_on)
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Renders the screen into a 32-bit framebuffer, row-major with a stride of [WIDTH]
    /// # Examples
    /// ```rust
    /// # use chip8_vm::*;
    /// let frame = Screen::new().to_argb(0xffffffff, 0);
    /// assert_eq!(64 * 32, frame.len());
    /// assert!(frame.iter().all(|&px| px == 0));
    /// ```
    pub fn to_argb(&self, fg: u32, bg: u32) -> Vec<u32> {
        self.pixels
            .iter()
            .map(|&on| if on { fg } else { bg })
            .collect()
    }

    /// Prints the screen to stdout at 1bpp
    ///
    /// Uses braille characters when the `drawille` feature is enabled,
    /// and box characters otherwise.
    pub fn print(&self) {
        #[cfg(feature = "drawille")]
        {
            use drawille::Canvas;
            let mut canvas = Canvas::new(WIDTH as u32, HEIGHT as u32);
            self.pixels
                .iter()
                .enumerate()
                .filter_map(|(index, &on)| on.then_some(index))
                .for_each(|index| canvas.set((index % WIDTH) as u32, (index / WIDTH) as u32));
            println!("{}", canvas.frame());
        }
        #[cfg(not(feature = "drawille"))]
        print!("{self}");
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for row in self.pixels.chunks(WIDTH) {
            let line: String = row.iter().map(|&on| if on { '█' } else { ' ' }).collect();
            writeln!(f, "|{line}|")?;
        }
        Ok(())
    }
}
