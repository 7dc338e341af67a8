//! I/O Class Registry
//!
//! Requests on `svc #2` describe a caller-owned buffer:
//! r0 = address, r1 = length, r2 = operation, r3 = operation argument.
//! The handler bounds-checks the address/length pair.

use super::args::Word;

/// Slot holding the I/O operation.
pub const OP_SLOT: usize = 2;

/// I/O operations known to the resident kernel.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    /// Write the buffer to the console
    Print = 0,
}

impl IoOp {
    /// Operation word written into slot 2.
    #[inline]
    pub const fn word(self) -> Word {
        self as Word
    }

    /// Look up an operation word.
    pub const fn from_word(word: Word) -> Option<Self> {
        match word {
            0 => Some(Self::Print),
            _ => None,
        }
    }
}
