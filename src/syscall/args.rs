//! Argument Marshalling
//!
//! Packs caller values into the four hand-off slots of a supervisor call.
//!
//! # Register Convention
//! ```text
//! ┌──────┬──────┬──────┬──────┐
//! │ r0   │ r1   │ r2   │ r3   │   in:  four argument words
//! ├──────┼──────┴──────┴──────┘
//! │ r0   │                         out: one signed result word
//! └──────┘
//! ```
//!
//! Slot order is part of the ABI. Every slot is always written; slots the
//! operation does not use are zero.

use core::fmt;

/// A single hand-off word.
pub type Word = u32;

/// Number of argument slots carried across the trap.
pub const SLOT_COUNT: usize = 4;

/// Width adjustment of a caller value into a [`Word`].
///
/// Unsigned values zero-extend, signed values keep their two's complement
/// bit pattern, and pointer-sized values keep their low 32 bits.
pub trait IntoWord {
    /// Convert into a hand-off word.
    fn into_word(self) -> Word;
}

macro_rules! impl_into_word {
    ($($ty:ty),*) => {
        $(
            impl IntoWord for $ty {
                #[inline]
                fn into_word(self) -> Word {
                    self as Word
                }
            }
        )*
    };
}

impl_into_word!(u8, u16, u32, usize, i8, i16, i32, isize);

impl IntoWord for bool {
    #[inline]
    fn into_word(self) -> Word {
        self as Word
    }
}

impl<T> IntoWord for *const T {
    #[inline]
    fn into_word(self) -> Word {
        self as usize as Word
    }
}

impl<T> IntoWord for *mut T {
    #[inline]
    fn into_word(self) -> Word {
        self as usize as Word
    }
}

/// The four argument words of one supervisor call.
///
/// This type is the register convention made explicit: slot `i` is loaded
/// into `r{i}` before the trap.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(C)]
pub struct SyscallArgs {
    slots: [Word; SLOT_COUNT],
}

impl SyscallArgs {
    /// All four slots zero.
    pub const ZERO: Self = Self {
        slots: [0; SLOT_COUNT],
    };

    /// Build from exactly four words.
    #[inline]
    pub const fn new(slots: [Word; SLOT_COUNT]) -> Self {
        Self { slots }
    }

    /// Pack up to four words, zero-filling the trailing slots.
    ///
    /// More than four words is rejected at compile time.
    #[inline]
    pub const fn pack<const N: usize>(words: [Word; N]) -> Self {
        const { assert!(N <= SLOT_COUNT, "a supervisor call carries at most four words") };

        let mut slots = [0; SLOT_COUNT];
        let mut i = 0;
        while i < N {
            slots[i] = words[i];
            i += 1;
        }
        Self { slots }
    }

    /// Pack a runtime slice of up to four words.
    ///
    /// Returns None if the slice holds more than four words.
    pub fn from_slice(words: &[Word]) -> Option<Self> {
        if words.len() > SLOT_COUNT {
            return None;
        }
        let mut slots = [0; SLOT_COUNT];
        slots[..words.len()].copy_from_slice(words);
        Some(Self { slots })
    }

    /// Read one slot.
    ///
    /// # Panics
    /// Panics if `index >= 4`.
    #[inline]
    pub const fn slot(&self, index: usize) -> Word {
        self.slots[index]
    }

    /// Copy of all four slots in register order.
    #[inline]
    pub const fn words(&self) -> [Word; SLOT_COUNT] {
        self.slots
    }

    /// Check whether every slot is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.slots[0] == 0 && self.slots[1] == 0 && self.slots[2] == 0 && self.slots[3] == 0
    }
}

impl From<[Word; SLOT_COUNT]> for SyscallArgs {
    fn from(slots: [Word; SLOT_COUNT]) -> Self {
        Self::new(slots)
    }
}

impl From<SyscallArgs> for [Word; SLOT_COUNT] {
    fn from(args: SyscallArgs) -> Self {
        args.slots
    }
}

impl fmt::Debug for SyscallArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r0, r1, r2, r3] = self.slots;
        write!(
            f,
            "SyscallArgs(r0={:#010x}, r1={:#010x}, r2={:#010x}, r3={:#010x})",
            r0, r1, r2, r3
        )
    }
}

/// Build a [`SyscallArgs`] from up to four values of any [`IntoWord`] type.
///
/// ```ignore
/// let args = args![buf.as_ptr(), buf.len(), 0u32];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::syscall::SyscallArgs::ZERO
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::syscall::SyscallArgs::pack([$($crate::syscall::IntoWord::into_word($arg)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_zero_fills_trailing_slots() {
        assert_eq!(SyscallArgs::pack([]).words(), [0, 0, 0, 0]);
        assert_eq!(SyscallArgs::pack([7]).words(), [7, 0, 0, 0]);
        assert_eq!(SyscallArgs::pack([7, 8, 9]).words(), [7, 8, 9, 0]);
        assert_eq!(SyscallArgs::pack([1, 2, 3, 4]).words(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(SyscallArgs::from_slice(&[5, 6]), Some(SyscallArgs::new([5, 6, 0, 0])));
        assert_eq!(SyscallArgs::from_slice(&[]), Some(SyscallArgs::ZERO));
        assert!(SyscallArgs::from_slice(&[1, 2, 3, 4, 5]).is_none());
    }

    #[test]
    fn test_width_adjustment() {
        assert_eq!(0xABu8.into_word(), 0xAB);
        assert_eq!((-1i32).into_word(), 0xFFFF_FFFF);
        assert_eq!((-2i8).into_word(), 0xFFFF_FFFE);
        assert_eq!(true.into_word(), 1);
        assert_eq!((0x1234_5678usize).into_word(), 0x1234_5678);
    }

    #[test]
    fn test_args_macro_keeps_order() {
        let args = crate::args![1u8, 2u16, 3u32, -1i32];
        assert_eq!(args.words(), [1, 2, 3, 0xFFFF_FFFF]);
        assert_eq!(crate::args![], SyscallArgs::ZERO);
        assert!(crate::args![0u32, 0u32].is_zero());
    }
}
