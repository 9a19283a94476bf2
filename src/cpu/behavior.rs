// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Contains implementations for each Chip-8 [Insn]
//!
//! Instructions which can fault check everything up front,
//! so a failed instruction never leaves a partial write behind.

use super::{instruction::Insn, mem::FONT_ADDR, *};
use crate::screen::{HEIGHT, WIDTH};
use rand::Rng;

impl CPU {
    /// Executes a single [Insn]
    #[rustfmt::skip]
    #[inline(always)]
    pub(super) fn execute(&mut self, instruction: Insn) -> Result<()> {
        match instruction {
            Insn::cls               => self.clear_screen(),
            Insn::ret               => self.ret()?,
            Insn::jmp   {       A } => self.jump(A),
            Insn::call  {       A } => self.call(A)?,
            Insn::seb   {    x, B } => self.skip_equals_immediate(x, B),
            Insn::sneb  {    x, B } => self.skip_not_equals_immediate(x, B),
            Insn::se    { y, x    } => self.skip_equals(x, y),
            Insn::movb  {    x, B } => self.load_immediate(x, B),
            Insn::addb  {    x, B } => self.add_immediate(x, B),
            Insn::mov   { y, x    } => self.load(x, y),
            Insn::or    { y, x    } => self.or(x, y),
            Insn::and   { y, x    } => self.and(x, y),
            Insn::xor   { y, x    } => self.xor(x, y),
            Insn::add   { y, x    } => self.add(x, y),
            Insn::sub   { y, x    } => self.sub(x, y),
            Insn::shr   { y, x    } => self.shift_right(x, y),
            Insn::bsub  { y, x    } => self.backwards_sub(x, y),
            Insn::shl   { y, x    } => self.shift_left(x, y),
            Insn::sne   { y, x    } => self.skip_not_equals(x, y),
            Insn::movI  {       A } => self.load_i_immediate(A),
            Insn::jmpr  {       A } => self.jump_indexed(A),
            Insn::rand  {    x, B } => self.rand(x, B),
            Insn::draw  { y, x, n } => self.draw(x, y, n)?,
            Insn::sek   {    x    } => self.skip_key_equals(x),
            Insn::snek  {    x    } => self.skip_key_not_equals(x),
            Insn::getdt {    x    } => self.load_delay_timer(x),
            Insn::waitk {    x    } => self.wait_for_key(x),
            Insn::setdt {    x    } => self.store_delay_timer(x),
            Insn::movst {    x    } => self.store_sound_timer(x),
            Insn::addI  {    x    } => self.add_i(x),
            Insn::font  {    x    } => self.load_sprite(x),
            Insn::bcd   {    x    } => self.bcd_convert(x)?,
            Insn::dmao  {    x    } => self.store_dma(x)?,
            Insn::dmai  {    x    } => self.load_dma(x)?,
        }
        Ok(())
    }
}

/// |`00nn`| System instructions
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`00e0`| Clear screen memory to all 0       |
/// |`00ee`| Return from subroutine             |
impl CPU {
    /// |`00e0`| Clears the screen memory to 0
    #[inline(always)]
    pub(super) fn clear_screen(&mut self) {
        self.screen.clear();
    }
    /// |`00ee`| Returns from subroutine
    ///
    /// Returns [Error::StackUnderflow] if there's nowhere to return to.
    #[inline(always)]
    pub(super) fn ret(&mut self) -> Result<()> {
        self.pc = self.stack.pop().ok_or(Error::StackUnderflow {
            pc: self.pc.wrapping_sub(2),
        })?;
        Ok(())
    }
}

/// |`1aaa`| Sets pc to an absolute address
impl CPU {
    /// |`1aaa`| Sets the program counter to an absolute address
    #[inline(always)]
    pub(super) fn jump(&mut self, a: Adr) {
        self.pc = a & 0x0fff;
    }
}

/// |`2aaa`| Pushes pc onto the stack, then jumps to a
impl CPU {
    /// |`2aaa`| Pushes pc onto the stack, then jumps to a
    ///
    /// Returns [Error::StackOverflow] if all 16 stack slots are in use.
    #[inline(always)]
    pub(super) fn call(&mut self, a: Adr) -> Result<()> {
        self.stack.push(self.pc).ok_or(Error::StackOverflow {
            pc: self.pc.wrapping_sub(2),
        })?;
        self.pc = a & 0x0fff;
        Ok(())
    }
}

/// |`3xbb`| Skips next instruction if register X == b
impl CPU {
    /// |`3xbb`| Skips the next instruction if register X == b
    #[inline(always)]
    pub(super) fn skip_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] == b {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`4xbb`| Skips next instruction if register X != b
impl CPU {
    /// |`4xbb`| Skips the next instruction if register X != b
    #[inline(always)]
    pub(super) fn skip_not_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] != b {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`5xy0`| Skips next instruction if register X == register Y
impl CPU {
    /// |`5xy0`| Skips the next instruction if register X == register Y
    #[inline(always)]
    pub(super) fn skip_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] == self.v[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`6xbb`| Loads immediate byte b into register vX
impl CPU {
    /// |`6xbb`| Loads immediate byte b into register vX
    #[inline(always)]
    pub(super) fn load_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = b;
    }
}

/// |`7xbb`| Adds immediate byte b to register vX
impl CPU {
    /// |`7xbb`| Adds immediate byte b to register vX, without touching vF
    #[inline(always)]
    pub(super) fn add_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = self.v[x].wrapping_add(b);
    }
}

/// |`8xyn`| Performs ALU operation
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`8xy0`| X = Y                              |
/// |`8xy1`| X = X | Y                          |
/// |`8xy2`| X = X & Y                          |
/// |`8xy3`| X = X ^ Y                          |
/// |`8xy4`| X = X + Y; Set vF=carry            |
/// |`8xy5`| X = X - Y; Set vF=!borrow          |
/// |`8xy6`| X = X >> 1; Set vF=shifted bit     |
/// |`8xy7`| X = Y - X; Set vF=!borrow          |
/// |`8xyE`| X = X << 1; Set vF=shifted bit     |
///
/// Flag-setting operations compute both results from the incoming registers,
/// then write vX, then vF. When X is F, the flag wins.
impl CPU {
    /// |`8xy0`| Loads the value of y into x
    #[inline(always)]
    pub(super) fn load(&mut self, x: Reg, y: Reg) {
        self.v[x] = self.v[y];
    }
    /// |`8xy1`| Performs bitwise or of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The original chip-8 interpreter will clobber vF for any 8-series instruction
    #[inline(always)]
    pub(super) fn or(&mut self, x: Reg, y: Reg) {
        self.v[x] |= self.v[y];
        if self.flags.quirks.vf_reset {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy2`| Performs bitwise and of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The original chip-8 interpreter will clobber vF for any 8-series instruction
    #[inline(always)]
    pub(super) fn and(&mut self, x: Reg, y: Reg) {
        self.v[x] &= self.v[y];
        if self.flags.quirks.vf_reset {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy3`| Performs bitwise xor of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The original chip-8 interpreter will clobber vF for any 8-series instruction
    #[inline(always)]
    pub(super) fn xor(&mut self, x: Reg, y: Reg) {
        self.v[x] ^= self.v[y];
        if self.flags.quirks.vf_reset {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy4`| Performs addition of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn add(&mut self, x: Reg, y: Reg) {
        let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[x] = sum;
        self.v[0xf] = carry.into();
    }
    /// |`8xy5`| Performs subtraction of vX and vY, and stores the result in vX
    ///
    /// vF is set when vX > vY
    #[inline(always)]
    pub(super) fn sub(&mut self, x: Reg, y: Reg) {
        let (vx, vy) = (self.v[x], self.v[y]);
        self.v[x] = vx.wrapping_sub(vy);
        self.v[0xf] = (vx > vy).into();
    }
    /// |`8xy6`| Performs bitwise right shift of vX
    ///
    /// # Quirk
    /// On the original chip-8 interpreter, this shifts vY and stores the result in vX
    #[inline(always)]
    pub(super) fn shift_right(&mut self, x: Reg, y: Reg) {
        let src = self.v[if self.flags.quirks.shift_vy { y } else { x }];
        self.v[x] = src >> 1;
        self.v[0xf] = src & 1;
    }
    /// |`8xy7`| Performs subtraction of vY and vX, and stores the result in vX
    ///
    /// vF is set when vY > vX
    #[inline(always)]
    pub(super) fn backwards_sub(&mut self, x: Reg, y: Reg) {
        let (vx, vy) = (self.v[x], self.v[y]);
        self.v[x] = vy.wrapping_sub(vx);
        self.v[0xf] = (vy > vx).into();
    }
    /// |`8xyE`| Performs bitwise left shift of vX
    ///
    /// # Quirk
    /// On the original chip-8 interpreter, this shifts vY and stores the result in vX
    #[inline(always)]
    pub(super) fn shift_left(&mut self, x: Reg, y: Reg) {
        let src = self.v[if self.flags.quirks.shift_vy { y } else { x }];
        self.v[x] = src << 1;
        self.v[0xf] = src >> 7;
    }
}

/// |`9xy0`| Skip next instruction if vX != vY
impl CPU {
    /// |`9xy0`| Skip next instruction if X != y
    #[inline(always)]
    pub(super) fn skip_not_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] != self.v[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`Aaaa`| Load address #a into register I
impl CPU {
    /// |`Aadr`| Load address #adr into register I
    #[inline(always)]
    pub(super) fn load_i_immediate(&mut self, a: Adr) {
        self.i = a;
    }
}

/// |`Baaa`| Jump to &adr + v0
impl CPU {
    /// |`Badr`| Jump to &adr + v0
    ///
    /// The sum isn't masked; landing past the end of memory faults on the next fetch.
    #[inline(always)]
    pub(super) fn jump_indexed(&mut self, a: Adr) {
        self.pc = a.wrapping_add(self.v[0] as Adr);
    }
}

/// |`Cxbb`| Stores a random number & the provided byte into vX
impl CPU {
    /// |`Cxbb`| Stores a random number & the provided byte into vX
    #[inline(always)]
    pub(super) fn rand(&mut self, x: Reg, b: u8) {
        self.v[x] = self.rng.gen::<u8>() & b;
    }
}

/// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
impl CPU {
    /// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
    ///
    /// The origin wraps around the screen. Pixels past the right or bottom edge
    /// are clipped, unless [Quirks::sprite_wrap] is set.
    ///
    /// vF is set if any lit pixel was turned off.
    #[inline(always)]
    pub(super) fn draw(&mut self, x: Reg, y: Reg, n: Nib) -> Result<()> {
        let (x, y) = (self.v[x] as usize % WIDTH, self.v[y] as usize % HEIGHT);
        let sprite = self.mem.grab(self.i as usize, n as usize)?;
        let wrap = self.flags.quirks.sprite_wrap;
        let mut collision = false;
        for (line, &row) in sprite.iter().enumerate() {
            for bit in (0..8).filter(|bit| row & (0x80 >> bit) != 0) {
                let (px, py) = match wrap {
                    true => ((x + bit) % WIDTH, (y + line) % HEIGHT),
                    false => (x + bit, y + line),
                };
                collision |= self.screen.flip(px, py).unwrap_or_default();
            }
        }
        self.v[0xf] = collision.into();
        Ok(())
    }
}

/// |`Exbb`| Skips instruction on value of keypress
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`eX9e`| Skip next instruction if key == vX |
/// |`eXa1`| Skip next instruction if key != vX |
impl CPU {
    /// |`Ex9E`| Skip next instruction if key vX is held
    #[inline(always)]
    pub(super) fn skip_key_equals(&mut self, x: Reg) {
        if self.keys[self.v[x] as usize & 0xf] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
    /// |`ExA1`| Skip next instruction if key vX isn't held
    #[inline(always)]
    pub(super) fn skip_key_not_equals(&mut self, x: Reg) {
        if !self.keys[self.v[x] as usize & 0xf] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`Fxbb`| Performs IO
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`fX07`| Set vX to value in delay timer     |
/// |`fX0a`| Wait for input, store key in vX    |
/// |`fX15`| Set delay timer to the value in vX |
/// |`fX18`| Set sound timer to the value in vX |
/// |`fX1e`| Add vX to I                        |
/// |`fX29`| Load sprite for character x into I |
/// |`fX33`| BCD convert X into I[0..3]         |
/// |`fX55`| DMA Stor from I to registers 0..=X |
/// |`fX65`| DMA Load from I to registers 0..=X |
impl CPU {
    /// |`Fx07`| Get the current DT, and put it in vX
    /// ```py
    /// vX = DT
    /// ```
    #[inline(always)]
    pub(super) fn load_delay_timer(&mut self, x: Reg) {
        self.v[x] = self.timers.delay;
    }
    /// |`Fx0A`| Wait for key, then vX = K
    ///
    /// Takes the lowest held key. If nothing is held, the pc is wound back,
    /// so this instruction runs again next cycle.
    #[inline(always)]
    pub(super) fn wait_for_key(&mut self, x: Reg) {
        if let Some(key) = self.keys.iter().position(|&held| held) {
            self.v[x] = key as u8;
        } else {
            self.pc = self.pc.wrapping_sub(2);
        }
    }
    /// |`Fx15`| Load vX into DT
    /// ```py
    /// DT = vX
    /// ```
    #[inline(always)]
    pub(super) fn store_delay_timer(&mut self, x: Reg) {
        self.timers.delay = self.v[x];
    }
    /// |`Fx18`| Load vX into ST
    /// ```py
    /// ST = vX;
    /// ```
    #[inline(always)]
    pub(super) fn store_sound_timer(&mut self, x: Reg) {
        self.timers.sound = self.v[x];
    }
    /// |`Fx1e`| Add vX to I,
    /// ```py
    /// I += vX;
    /// ```
    #[inline(always)]
    pub(super) fn add_i(&mut self, x: Reg) {
        self.i = self.i.wrapping_add(self.v[x] as Adr);
    }
    /// |`Fx29`| Load sprite for character x into I
    /// ```py
    /// I = sprite(X);
    /// ```
    #[inline(always)]
    pub(super) fn load_sprite(&mut self, x: Reg) {
        self.i = FONT_ADDR + 5 * (self.v[x] as Adr & 0xf);
    }
    /// |`Fx33`| BCD convert X into I`[0..3]`
    #[inline(always)]
    pub(super) fn bcd_convert(&mut self, x: Reg) -> Result<()> {
        let x = self.v[x];
        self.mem
            .grab_mut(self.i as usize, 3)?
            .copy_from_slice(&[x / 100, x / 10 % 10, x % 10]);
        Ok(())
    }
    /// |`Fx55`| DMA Stor from I to registers 0..=X
    ///
    /// # Quirk
    /// The original chip-8 interpreter uses I to directly index memory,
    /// with the side effect of leaving I as I+X+1 after the transfer is done.
    #[inline(always)]
    pub(super) fn store_dma(&mut self, x: Reg) -> Result<()> {
        self.mem
            .grab_mut(self.i as usize, x + 1)?
            .copy_from_slice(&self.v[..=x]);
        if self.flags.quirks.dma_inc {
            self.i = self.i.wrapping_add(x as Adr + 1);
        }
        Ok(())
    }
    /// |`Fx65`| DMA Load from I to registers 0..=X
    ///
    /// # Quirk
    /// The original chip-8 interpreter uses I to directly index memory,
    /// with the side effect of leaving I as I+X+1 after the transfer is done.
    #[inline(always)]
    pub(super) fn load_dma(&mut self, x: Reg) -> Result<()> {
        self.v[..=x].copy_from_slice(self.mem.grab(self.i as usize, x + 1)?);
        if self.flags.quirks.dma_inc {
            self.i = self.i.wrapping_add(x as Adr + 1);
        }
        Ok(())
    }
}
