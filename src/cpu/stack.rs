// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The call stack: 16 return addresses and a pointer

use super::Adr;

/// Number of return addresses the stack can hold
pub const STACK_DEPTH: usize = 16;

/// A fixed-depth stack of return addresses
///
/// The pointer always stays within `0..=16`; pushing onto a full stack or
/// popping an empty one returns [None] and leaves the stack untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    slots: [Adr; STACK_DEPTH],
    sp: usize,
}

impl Stack {
    /// Pushes a return address, if there's room
    /// # Examples
    /// ```rust
    /// # use chip8_vm::cpu::stack::Stack;
    /// let mut stack = Stack::default();
    /// for _ in 0..16 {
    ///     assert_eq!(Some(()), stack.push(0x202));
    /// }
    /// assert_eq!(None, stack.push(0x202));
    /// assert_eq!(16, stack.len());
    /// assert!(stack.is_full());
    /// ```
    pub fn push(&mut self, addr: Adr) -> Option<()> {
        let slot = self.slots.get_mut(self.sp)?;
        *slot = addr;
        self.sp += 1;
        Some(())
    }

    /// Pops the most recent return address, if there is one
    pub fn pop(&mut self) -> Option<Adr> {
        self.sp = self.sp.checked_sub(1)?;
        Some(self.slots[self.sp])
    }

    /// The stack pointer, i.e. the number of occupied slots
    pub fn len(&self) -> usize {
        self.sp
    }

    /// Returns true if nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// Returns true if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.sp == STACK_DEPTH
    }

    /// The occupied slots, oldest first
    pub fn as_slice(&self) -> &[Adr] {
        &self.slots[..self.sp]
    }
}
