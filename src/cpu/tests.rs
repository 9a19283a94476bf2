// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Unit tests for [super::CPU]
//!
//! These run instructions, and ensure their output is consistent with previous builds
//!
//! General test format:
//! 1. Prepare to do the thing
//! 2. Do the thing
//! 3. Compare the result to the expected result

use super::*;
use rand::random;


fn setup_environment() -> CPU {
    let mut cpu = CPU::with_rng(StdRng::seed_from_u64(0xc8));
    cpu.flags = Flags {
        debug: true,
        ..Default::default()
    };
    cpu
}

/// Writes a big-endian word into memory at `addr`
fn write_word(cpu: &mut CPU, addr: usize, word: u16) {
    cpu.mem
        .grab_mut(addr, 2)
        .expect("addr should be in memory")
        .copy_from_slice(&word.to_be_bytes());
}

/// Unused instructions
mod unimplemented {
    use super::*;

    fn assert_unimplemented(word: u16) {
        let mut cpu = setup_environment();
        write_word(&mut cpu, 0x200, word);
        match cpu.cycle() {
            Err(Error::UnimplementedOpcode { word: w }) => assert_eq!(word, w),
            other => panic!("{word:04x} should not be an instruction, got {other:?}"),
        }
        // nothing moved
        assert_eq!(0x200, cpu.pc);
        assert_eq!(0, cpu.cycle);
    }
    #[test]
    fn ins_0nnn() {
        assert_unimplemented(0x0123);
    }
    #[test]
    fn ins_5xyn() {
        assert_unimplemented(0x500f);
    }
    #[test]
    fn ins_8xyn() {
        assert_unimplemented(0x800f);
    }
    #[test]
    fn ins_9xyn() {
        assert_unimplemented(0x900f);
    }
    #[test]
    fn ins_exbb() {
        assert_unimplemented(0xe00f);
    }
    #[test]
    fn ins_fxbb() {
        assert_unimplemented(0xf00f);
    }
    /// Lenient mode skips over anything it doesn't recognize
    #[test]
    fn lenient() {
        let mut cpu = setup_environment();
        cpu.flags.lenient = true;
        write_word(&mut cpu, 0x200, 0xffff);
        cpu.cycle().expect("lenient mode should skip 0xffff");
        assert_eq!(0x202, cpu.pc);
        assert_eq!(1, cpu.cycle);
    }
}

mod sys {
    use super::*;
    /// 00e0: Clears the screen memory to 0
    #[test]
    fn clear_screen() {
        let mut cpu = setup_environment();
        for (x, y) in [(0, 0), (10, 20), (63, 31)] {
            cpu.screen.flip(x, y);
        }
        cpu.clear_screen();
        assert!(cpu.screen.pixels().iter().all(|&px| !px));
    }

    /// 00ee: Returns from subroutine
    #[test]
    fn ret() {
        let test_addr = random::<u16>() & 0x7ff;
        let mut cpu = setup_environment();
        // Place the address on the stack
        cpu.stack.push(test_addr).expect("stack is empty");

        cpu.ret().expect("stack holds an address");

        // Verify the current address is the address from the stack
        assert_eq!(test_addr, cpu.pc);
        assert!(cpu.stack.is_empty());
    }

    /// 00ee: Returning with nothing on the stack is an error
    #[test]
    fn ret_underflow() {
        let mut cpu = setup_environment();
        cpu.pc = 0x202;
        match cpu.ret() {
            Err(Error::StackUnderflow { pc }) => assert_eq!(0x200, pc),
            other => panic!("expected StackUnderflow, got {other:?}"),
        }
        assert_eq!(0x202, cpu.pc);
    }
}

/// Tests control-flow instructions
///
/// Basically anything that touches the program counter
mod cf {
    use super::*;
    /// 1aaa: Sets the program counter to an absolute address
    #[test]
    fn jump() {
        let mut cpu = setup_environment();
        // Test all valid addresses
        for addr in 0x000..0x1000 {
            // Jump to an address
            cpu.jump(addr);
            // Verify the current address is the jump target address
            assert_eq!(addr, cpu.pc);
        }
        // Only 12 bits are kept
        cpu.jump(0xf234);
        assert_eq!(0x234, cpu.pc);
    }

    /// 2aaa: Pushes pc onto the stack, then jumps to a
    #[test]
    fn call() {
        let test_addr = random::<u16>() & 0xfff;
        let mut cpu = setup_environment();
        // Save the current address
        let curr_addr = cpu.pc;
        // Call an address
        cpu.call(test_addr).expect("stack is empty");
        // Verify the current address is the called address
        assert_eq!(test_addr, cpu.pc);
        // Verify the previous address was stored on the stack
        let stack_addr: u16 = cpu.stack.pop().expect("This should return curr_addr");
        assert_eq!(stack_addr, curr_addr);
    }

    /// 2aaa: Calling with all 16 slots occupied is an error
    #[test]
    fn call_overflow() {
        let mut cpu = setup_environment();
        for depth in 0..16 {
            cpu.call(0x200 + 2 * depth).expect("stack has room");
        }
        let (pc, stack) = (cpu.pc, cpu.stack.clone());
        match cpu.call(0x300) {
            Err(Error::StackOverflow { .. }) => (),
            other => panic!("expected StackOverflow, got {other:?}"),
        }
        // no change has been made
        assert_eq!(pc, cpu.pc);
        assert_eq!(stack, cpu.stack);
    }

    /// 2aaa then 00ee: Returns to the instruction after the call
    #[test]
    fn call_ret() {
        let mut cpu = setup_environment();
        for addr in 0x000u16..0x1000 {
            let start = random::<u16>() & 0xffc;
            if addr.abs_diff(start) < 2 || addr > 0xffe {
                continue;
            }
            write_word(&mut cpu, start as usize, 0x2000 | addr);
            write_word(&mut cpu, addr as usize, 0x00ee);
            cpu.pc = start;
            cpu.cycle().expect("call should succeed");
            assert_eq!(addr, cpu.pc);
            cpu.cycle().expect("ret should succeed");
            assert_eq!(start + 2, cpu.pc);
        }
    }

    /// 3xbb: Skips the next instruction if register X == b
    #[test]
    fn skip_equals_immediate() {
        let mut cpu = setup_environment();
        for a in 0..=0xff {
            for b in 0..=0xff {
                let (x, addr) = (random::<usize>() & 0xf, random::<u16>() & 0x7fe);
                cpu.pc = addr;
                cpu.v[x] = a;

                cpu.skip_equals_immediate(x, b);

                assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
            }
        }
    }

    /// 4xbb: Skips the next instruction if register X != b
    #[test]
    fn skip_not_equals_immediate() {
        let mut cpu = setup_environment();
        for a in 0..=0xff {
            for b in 0..=0xff {
                let (x, addr) = (random::<usize>() & 0xf, random::<u16>() & 0x7fe);
                cpu.pc = addr;
                cpu.v[x] = a;

                cpu.skip_not_equals_immediate(x, b);

                assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
            }
        }
    }

    /// 5xy0: Skips the next instruction if register X == register Y
    #[test]
    fn skip_equals() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let (x, y) = (1, 2);
            cpu.pc = addr;
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.skip_equals(x, y);

            assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
        }
    }

    /// 9xy0: Skip next instruction if X != y
    #[test]
    fn skip_not_equals() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let (x, y) = (1, 2);
            cpu.pc = addr;
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.skip_not_equals(x, y);

            assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
        }
    }

    /// Skips cost 4 bytes of pc when taken, 2 otherwise, across a whole cycle
    #[test]
    fn skip_cycle() {
        for (word, v0, expected) in [
            (0x3005u16, 5u8, 0x204u16),
            (0x3005, 6, 0x202),
            (0x4005, 6, 0x204),
            (0x4005, 5, 0x202),
            (0x5010, 0, 0x204),
            (0x5010, 1, 0x202),
            (0x9010, 1, 0x204),
            (0x9010, 0, 0x202),
        ] {
            let mut cpu = setup_environment();
            write_word(&mut cpu, 0x200, word);
            cpu.v[0] = v0;
            cpu.cycle().expect("skips are valid instructions");
            assert_eq!(expected, cpu.pc, "{word:04x} with v0 = {v0}");
        }
    }

    /// Badr: Jump to &adr + v0
    #[test]
    fn jump_indexed() {
        let mut cpu = setup_environment();
        // For every valid address
        for addr in 0..0x1000 {
            // For every valid offset
            for v0 in 0..=0xff {
                // set v[0] = v0
                cpu.v[0] = v0;

                cpu.jump_indexed(addr);

                assert_eq!(cpu.pc, addr.wrapping_add(v0.into()));
            }
        }
    }
}

mod math {
    use super::*;
    /// 6xbb: Loads immediate byte b into register vX
    #[test]
    fn load_immediate() {
        let mut cpu = setup_environment();
        for test_register in 0x0..=0xf {
            for test_byte in 0x0..=0xff {
                cpu.load_immediate(test_register, test_byte);
                assert_eq!(cpu.v[test_register], test_byte)
            }
        }
    }

    /// 6xbb then 7xbb: sums wrap, and vF is left alone
    #[test]
    fn add_immediate() {
        let mut cpu = setup_environment();
        for a in 0x0..=0xff {
            for b in 0x0..=0xff {
                let x = random::<usize>() % 0xf;
                cpu.v[0xf] = 0xc5; // sentinel

                cpu.load_immediate(x, a);
                cpu.add_immediate(x, b);

                assert_eq!(cpu.v[x], a.wrapping_add(b));
                assert_eq!(cpu.v[0xf], 0xc5);
            }
        }
    }

    /// 8xy0: Loads the value of y into x
    #[test]
    fn load() {
        let mut cpu = setup_environment();
        // We use zero as a sentinel value for this test, so loop from 1 to 255
        for test_value in 1..=0xff {
            for reg in 0..=0xff {
                let (x, y) = (reg & 0xf, reg >> 4);
                if x == y {
                    continue;
                }
                // Set vY to the test value
                cpu.v[y] = test_value;
                // zero X
                cpu.v[x] = 0;

                cpu.load(x, y);

                // verify results
                assert_eq!(cpu.v[x], test_value);
                assert_eq!(cpu.v[y], test_value);
            }
        }
    }

    /// Runs a bitwise op over every pair of bytes, with and without [Quirks::vf_reset]
    fn test_bitwise(op: fn(&mut CPU, Reg, Reg), expect: fn(u8, u8) -> u8) {
        for vf_reset in [false, true] {
            let mut cpu = setup_environment();
            cpu.flags.quirks.vf_reset = vf_reset;
            for word in 0..=0xffffu16 {
                let (a, b) = (word as u8, (word >> 8) as u8);
                let (x, y) = (1, 2);
                cpu.v[0xf] = 0xc5; // sentinel
                (cpu.v[x], cpu.v[y]) = (a, b);

                op(&mut cpu, x, y);

                assert_eq!(cpu.v[x], expect(a, b));
                assert_eq!(cpu.v[0xf], if vf_reset { 0 } else { 0xc5 });
            }
        }
    }

    /// 8xy1: Performs bitwise or of vX and vY, and stores the result in vX
    #[test]
    fn or() {
        test_bitwise(CPU::or, |a, b| a | b);
    }
    /// 8xy2: Performs bitwise and of vX and vY, and stores the result in vX
    #[test]
    fn and() {
        test_bitwise(CPU::and, |a, b| a & b);
    }
    /// 8xy3: Performs bitwise xor of vX and vY, and stores the result in vX
    #[test]
    fn xor() {
        test_bitwise(CPU::xor, |a, b| a ^ b);
    }

    /// 8xy4: Performs addition of vX and vY, and stores the result in vX
    #[test]
    fn add() {
        let mut cpu = setup_environment();
        for word in 0..=0xffffu16 {
            let (a, b) = (word as u8, (word >> 8) as u8);
            (cpu.v[3], cpu.v[4]) = (a, b);

            cpu.add(3, 4);

            let sum = a as u16 + b as u16;
            assert_eq!(cpu.v[3], sum as u8);
            assert_eq!(cpu.v[0xf], (sum > 0xff) as u8);
        }
    }

    /// 8xy5: Performs subtraction of vX and vY, and stores the result in vX
    #[test]
    fn sub() {
        let mut cpu = setup_environment();
        for word in 0..=0xffffu16 {
            let (a, b) = (word as u8, (word >> 8) as u8);
            (cpu.v[3], cpu.v[4]) = (a, b);

            cpu.sub(3, 4);

            assert_eq!(cpu.v[3], a.wrapping_sub(b));
            assert_eq!(cpu.v[0xf], (a > b) as u8);
        }
    }

    /// 8xy7: Performs subtraction of vY and vX, and stores the result in vX
    #[test]
    fn backwards_sub() {
        let mut cpu = setup_environment();
        for word in 0..=0xffffu16 {
            let (a, b) = (word as u8, (word >> 8) as u8);
            (cpu.v[3], cpu.v[4]) = (a, b);

            cpu.backwards_sub(3, 4);

            assert_eq!(cpu.v[3], b.wrapping_sub(a));
            assert_eq!(cpu.v[0xf], (b > a) as u8);
        }
    }

    /// 8xy6: Performs bitwise right shift of vX
    #[test]
    fn shift_right() {
        let mut cpu = setup_environment();
        for value in 0..=0xff {
            cpu.v[5] = value;
            cpu.v[6] = !value; // vY is ignored

            cpu.shift_right(5, 6);

            assert_eq!(cpu.v[5], value >> 1);
            assert_eq!(cpu.v[0xf], value & 1);
        }
    }

    /// 8xyE: Performs bitwise left shift of vX
    #[test]
    fn shift_left() {
        let mut cpu = setup_environment();
        for value in 0..=0xff {
            cpu.v[5] = value;
            cpu.v[6] = !value; // vY is ignored

            cpu.shift_left(5, 6);

            assert_eq!(cpu.v[5], value << 1);
            assert_eq!(cpu.v[0xf], value >> 7);
        }
    }

    /// Tests [Quirks::shift_vy] behavior
    #[test]
    fn shift_quirk() {
        let mut cpu = setup_environment();
        cpu.flags.quirks.shift_vy = true;
        for value in 0..=0xff {
            (cpu.v[5], cpu.v[6]) = (0, value);
            cpu.shift_right(5, 6);
            assert_eq!((cpu.v[5], cpu.v[0xf]), (value >> 1, value & 1));

            (cpu.v[5], cpu.v[6]) = (0, value);
            cpu.shift_left(5, 6);
            assert_eq!((cpu.v[5], cpu.v[0xf]), (value << 1, value >> 7));
        }
    }

    /// vF is written after vX, so when they're the same register, the flag wins
    #[test]
    fn flag_after_result() {
        let mut cpu = setup_environment();
        for (word, vf, v1, expected) in [
            (0x8f06u16, 0x81u8, 0x00u8, 0x01u8), // shr: lsb of 0x81
            (0x8f0e, 0x81, 0x00, 0x01),          // shl: msb of 0x81
            (0x8f06, 0x80, 0x00, 0x00),
            (0x8f0e, 0x01, 0x00, 0x00),
            (0x8f14, 0xff, 0x02, 0x01), // add: carry
            (0x8f14, 0x01, 0x02, 0x00),
            (0x8f15, 0x10, 0x01, 0x01), // sub: vF > v1
            (0x8f15, 0x01, 0x10, 0x00),
            (0x8f17, 0x01, 0x10, 0x01), // bsub: v1 > vF
            (0x8f17, 0x10, 0x01, 0x00),
        ] {
            write_word(&mut cpu, 0x200, word);
            cpu.pc = 0x200;
            (cpu.v[0xf], cpu.v[1]) = (vf, v1);

            cpu.cycle().expect("8xyn is an instruction");

            assert_eq!(expected, cpu.v[0xf], "{word:04x} with vF = {vf:02x}, v1 = {v1:02x}");
        }
    }

    /// When Y is F, the result uses vF's value from before the instruction
    #[test]
    fn flag_as_operand() {
        let mut cpu = setup_environment();
        (cpu.v[1], cpu.v[0xf]) = (0x10, 0x01);
        cpu.sub(1, 0xf);
        assert_eq!((0x0f, 0x01), (cpu.v[1], cpu.v[0xf]));

        (cpu.v[1], cpu.v[0xf]) = (0x01, 0x10);
        cpu.backwards_sub(1, 0xf);
        assert_eq!((0x0f, 0x01), (cpu.v[1], cpu.v[0xf]));

        (cpu.v[1], cpu.v[0xf]) = (0xf0, 0x20);
        cpu.add(1, 0xf);
        assert_eq!((0x10, 0x01), (cpu.v[1], cpu.v[0xf]));
    }
}

mod i {
    use super::*;
    /// Aadr: Load address #adr into register I
    #[test]
    fn load_i_immediate() {
        let mut cpu = setup_environment();
        for addr in 0..0x1000 {
            cpu.load_i_immediate(addr);
            assert_eq!(cpu.i, addr);
        }
    }

    /// Fx1e: Add vX to I, without masking
    #[test]
    fn add_i() {
        let mut cpu = setup_environment();
        cpu.i = 0xffa;
        cpu.v[2] = 0x10;
        cpu.add_i(2);
        assert_eq!(0x100a, cpu.i);
    }

    /// Fx29: Load sprite for character x into I
    #[test]
    fn load_sprite() {
        let mut cpu = setup_environment();
        for digit in 0..=0xff {
            cpu.v[3] = digit;
            cpu.load_sprite(3);
            assert_eq!(cpu.i, 0x50 + 5 * (digit as u16 & 0xf));
        }
    }

    /// The glyph for each digit sits where Fx29 says it does
    #[test]
    fn glyphs() {
        let mut cpu = setup_environment();
        for digit in 0..0x10u8 {
            cpu.v[0] = digit;
            cpu.load_sprite(0);
            let glyph = cpu.mem.grab(cpu.i as usize, 5).unwrap();
            assert_eq!(glyph, &mem::CHARSET[5 * digit as usize..][..5]);
        }
    }
}

mod rng {
    use super::*;
    /// Cxbb: Stores a random number & the provided byte into vX
    #[test]
    fn mask() {
        let mut cpu = setup_environment();
        for b in 0..=0xff {
            for _ in 0..16 {
                cpu.rand(0, b);
                assert_eq!(0, cpu.v[0] & !b);
            }
        }
    }

    /// The same seed draws the same numbers
    #[test]
    fn seeded() {
        let (mut a, mut b) = (setup_environment(), setup_environment());
        for x in 0..0x10 {
            a.rand(x, 0xff);
            b.rand(x, 0xff);
        }
        assert_eq!(a.v, b.v);
    }
}

mod draw {
    use super::*;

    fn lit(cpu: &CPU) -> usize {
        cpu.screen.pixels().iter().filter(|&&px| px).count()
    }

    /// Dxyn: XORs the sprite onto the screen, flagging collisions in vF
    #[test]
    fn collision() {
        let mut cpu = setup_environment();
        cpu.i = 0x300;
        cpu.mem.grab_mut(0x300, 1).unwrap()[0] = 0xff;
        (cpu.v[0], cpu.v[1]) = (0, 0);

        cpu.draw(0, 1, 1).unwrap();
        assert_eq!(0, cpu.v[0xf]);
        for x in 0..8 {
            assert_eq!(Some(true), cpu.screen.get(x, 0));
        }
        assert_eq!(8, lit(&cpu));

        cpu.draw(0, 1, 1).unwrap();
        assert_eq!(1, cpu.v[0xf]);
        assert_eq!(0, lit(&cpu));
    }

    /// The origin wraps, but the pixels past the edge are clipped
    #[test]
    fn clip() {
        let mut cpu = setup_environment();
        cpu.i = 0x300;
        cpu.mem.grab_mut(0x300, 2).unwrap().copy_from_slice(&[0xff, 0xff]);
        (cpu.v[0], cpu.v[1]) = (64 + 60, 32 + 31);

        cpu.draw(0, 1, 2).unwrap();

        assert_eq!(0, cpu.v[0xf]);
        assert_eq!(4, lit(&cpu));
        for x in 60..64 {
            assert_eq!(Some(true), cpu.screen.get(x, 31));
        }
    }

    /// Tests [Quirks::sprite_wrap] behavior
    #[test]
    fn wrap_quirk() {
        let mut cpu = setup_environment();
        cpu.flags.quirks.sprite_wrap = true;
        cpu.i = 0x300;
        cpu.mem.grab_mut(0x300, 2).unwrap().copy_from_slice(&[0xff, 0xff]);
        (cpu.v[0], cpu.v[1]) = (60, 31);

        cpu.draw(0, 1, 2).unwrap();

        assert_eq!(16, lit(&cpu));
        for x in (60..64).chain(0..4) {
            assert_eq!(Some(true), cpu.screen.get(x, 31));
            assert_eq!(Some(true), cpu.screen.get(x, 0));
        }
    }

    /// A digit from the glyph table draws as expected
    #[test]
    fn glyph() {
        let mut cpu = setup_environment();
        cpu.v[2] = 0x0;
        cpu.load_sprite(2);
        cpu.draw(2, 2, 5).unwrap();
        // "0" is a 4x5 box with a hollow middle
        assert_eq!(14, lit(&cpu));
        assert_eq!(Some(false), cpu.screen.get(1, 1));
    }

    /// Reading a sprite from past the end of memory fails, and draws nothing
    #[test]
    fn out_of_range() {
        let mut cpu = setup_environment();
        cpu.i = 0xffe;
        cpu.v[0xf] = 0xc5;
        match cpu.draw(0, 0, 4) {
            Err(Error::AddressOutOfRange { range }) => assert_eq!(0xffe..0x1002, range),
            other => panic!("expected AddressOutOfRange, got {other:?}"),
        }
        assert_eq!(0, lit(&cpu));
        assert_eq!(0xc5, cpu.v[0xf]);
    }
}

mod io {
    use super::*;
    /// Ex9E: Skip next instruction if key vX is held
    #[test]
    fn skip_key_equals() {
        let mut cpu = setup_environment();
        for key in 0..0x10 {
            for held in [false, true] {
                cpu.keys = [false; 16];
                cpu.keys[key] = held;
                cpu.v[4] = key as u8;
                cpu.pc = 0x202;

                cpu.skip_key_equals(4);

                assert_eq!(if held { 0x204 } else { 0x202 }, cpu.pc);
            }
        }
    }

    /// ExA1: Skip next instruction if key vX isn't held
    #[test]
    fn skip_key_not_equals() {
        let mut cpu = setup_environment();
        for key in 0..0x10 {
            for held in [false, true] {
                cpu.keys = [false; 16];
                cpu.keys[key] = held;
                cpu.v[4] = key as u8;
                cpu.pc = 0x202;

                cpu.skip_key_not_equals(4);

                assert_eq!(if held { 0x202 } else { 0x204 }, cpu.pc);
            }
        }
    }

    /// Fx0A: Spins in place until a key is held, then takes the lowest one
    #[test]
    fn wait_for_key() {
        let mut cpu = setup_environment();
        write_word(&mut cpu, 0x200, 0xf30a);
        for _ in 0..10 {
            cpu.cycle().unwrap();
            assert_eq!(0x200, cpu.pc);
        }
        cpu.keys[0xb] = true;
        cpu.keys[0x7] = true;
        cpu.cycle().unwrap();
        assert_eq!(0x202, cpu.pc);
        assert_eq!(0x7, cpu.v[3]);
    }

    /// Fx07, Fx15, Fx18: Move between vX and the timers
    #[test]
    fn timers() {
        let mut cpu = setup_environment();
        cpu.v[1] = 0x42;
        cpu.store_delay_timer(1);
        cpu.store_sound_timer(1);
        assert_eq!((0x42, 0x42), (cpu.timers.delay, cpu.timers.sound));
        cpu.timers.delay = 0x24;
        cpu.load_delay_timer(2);
        assert_eq!(0x24, cpu.v[2]);
    }

    /// Fx33: BCD convert X into I`[0..3]`
    #[test]
    fn bcd_convert() {
        let mut cpu = setup_environment();
        cpu.i = 0x400;
        for value in 0..=0xff {
            cpu.v[6] = value;
            cpu.bcd_convert(6).unwrap();
            let digits = cpu.mem.grab(0x400, 3).unwrap();
            assert_eq!(value as usize, 100 * digits[0] as usize + 10 * digits[1] as usize + digits[2] as usize);
        }
        for (value, expected) in [(226, [2u8, 2, 6]), (0, [0, 0, 0]), (255, [2, 5, 5])] {
            cpu.v[6] = value;
            cpu.bcd_convert(6).unwrap();
            assert_eq!(&expected, cpu.mem.grab(0x400, 3).unwrap());
        }
    }

    /// Fx33: Writing past the end of memory fails without writing anything
    #[test]
    fn bcd_out_of_range() {
        let mut cpu = setup_environment();
        cpu.i = 0xffe;
        cpu.v[0] = 123;
        cpu.bcd_convert(0).expect_err("0xffe..0x1001 is out of range");
        assert_eq!(Some(0), cpu.mem.get(0xffe));
        assert_eq!(Some(0), cpu.mem.get(0xfff));
    }

    /// Fx55 then Fx65: Registers survive a round trip through memory
    #[test]
    fn dma_round_trip() {
        let mut cpu = setup_environment();
        cpu.i = 0x500;
        for x in 0..0x10 {
            let original: [u8; 16] = random();
            cpu.v = original;

            cpu.store_dma(x).unwrap();
            cpu.v[..=x].fill(0);
            cpu.load_dma(x).unwrap();

            assert_eq!(original, cpu.v);
            assert_eq!(0x500, cpu.i);
        }
    }

    /// Fx55: Only registers 0..=X are stored
    #[test]
    fn store_dma() {
        let mut cpu = setup_environment();
        cpu.i = 0x500;
        cpu.v = *b"0123456789abcdef";
        cpu.store_dma(3).unwrap();
        assert_eq!(b"0123\0", cpu.mem.grab(0x500, 5).unwrap());
    }

    /// Tests [Quirks::dma_inc] behavior
    #[test]
    fn dma_quirk() {
        let mut cpu = setup_environment();
        cpu.flags.quirks.dma_inc = true;
        cpu.i = 0x500;
        cpu.store_dma(3).unwrap();
        assert_eq!(0x504, cpu.i);
        cpu.load_dma(0xf).unwrap();
        assert_eq!(0x514, cpu.i);
    }

    /// Fx55/Fx65: Transfers past the end of memory fail without touching anything
    #[test]
    fn dma_out_of_range() {
        let mut cpu = setup_environment();
        cpu.i = 0xff8;
        cpu.v = [0xaa; 16];
        cpu.store_dma(0xf).expect_err("0xff8..0x1008 is out of range");
        assert!(cpu.mem.grab(0xff8, 8).unwrap().iter().all(|&b| b == 0));
        cpu.load_dma(0xf).expect_err("0xff8..0x1008 is out of range");
        assert_eq!([0xaau8; 16], cpu.v);
    }
}

/// Tests the fetch-decode-execute-tick cycle
mod cycle {
    use super::*;

    /// Timers tick once per cycle, and stop at zero
    #[test]
    fn timers_tick() {
        let mut cpu = setup_environment();
        cpu.load_program_bytes(&[0x12, 0x00]).unwrap(); // jmp 200
        cpu.timers = timers::Timers { delay: 3, sound: 1 };
        cpu.cycle().unwrap();
        assert_eq!((2, 0), (cpu.delay(), cpu.sound()));
        cpu.multistep(5).unwrap();
        assert_eq!((0, 0), (cpu.delay(), cpu.sound()));
    }

    /// With [Flags::external_timers], only [CPU::tick_timers] touches the timers
    #[test]
    fn external_timers() {
        let mut cpu = setup_environment();
        cpu.flags.external_timers = true;
        cpu.load_program_bytes(&[0x12, 0x00]).unwrap(); // jmp 200
        cpu.timers = timers::Timers { delay: 3, sound: 3 };
        cpu.multistep(10).unwrap();
        assert_eq!((3, 3), (cpu.delay(), cpu.sound()));
        cpu.tick_timers();
        assert_eq!((2, 2), (cpu.delay(), cpu.sound()));
    }

    /// A paused CPU does nothing
    #[test]
    fn pause() {
        let mut cpu = setup_environment();
        cpu.load_program_bytes(&[0x60, 0x01]).unwrap();
        cpu.flags.pause = true;
        cpu.cycle().unwrap();
        assert_eq!((0x200, 0, 0), (cpu.pc, cpu.v[0], cpu.cycle));
    }

    /// A faulting instruction leaves the pc pointing at itself, and the timers alone
    #[test]
    fn fault_is_atomic() {
        let mut cpu = setup_environment();
        cpu.load_program_bytes(&[0x00, 0xee]).unwrap(); // ret
        cpu.timers = timers::Timers { delay: 3, sound: 3 };
        cpu.cycle().expect_err("nothing to return to");
        assert_eq!(0x200, cpu.pc);
        assert_eq!((3, 3), (cpu.delay(), cpu.sound()));
        assert_eq!(0, cpu.cycle);
    }

    /// Fetching past the end of memory fails
    #[test]
    fn fetch_out_of_range() {
        let mut cpu = setup_environment();
        cpu.pc = 0xfff;
        match cpu.cycle() {
            Err(Error::AddressOutOfRange { range }) => assert_eq!(0xfff..0x1001, range),
            other => panic!("expected AddressOutOfRange, got {other:?}"),
        }
    }
}
