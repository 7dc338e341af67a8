//! Kernel Class Registry
//!
//! Sub-operations multiplexed onto `svc #1`. The discriminator always sits
//! in slot 1; slot 0 carries the primary operand and slots 2-3 the rest.
//!
//! | Operation    | r0       | r1 | r2   | r3      |
//! |--------------|----------|----|------|---------|
//! | `Yield`      | 0        | 0  | 0    | 0       |
//! | `Sleep`      | ms       | 1  | 0    | 0       |
//! | `SyncCreate` | init     | 3  | kind | max     |
//! | `Sync`       | kobj     | 4  | kind | value   |
//! | `Pend`       | kobj     | 5  | kind | timeout |
//!
//! The registry belongs to the resident kernel. Discriminator 2 is
//! reserved.

use core::fmt;

use super::args::Word;

/// Slot holding the kernel sub-operation discriminator.
pub const DISCRIMINATOR_SLOT: usize = 1;

/// Kernel sub-operation discriminators.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelOp {
    /// Give up the rest of the time slice
    Yield = 0,
    /// Suspend for a number of milliseconds
    Sleep = 1,
    /// Create a synchronization object
    SyncCreate = 3,
    /// Release / notify a synchronization object
    Sync = 4,
    /// Wait on a synchronization object
    Pend = 5,
}

impl KernelOp {
    /// Discriminator word written into slot 1.
    #[inline]
    pub const fn discriminator(self) -> Word {
        self as Word
    }

    /// Look up a discriminator read from slot 1.
    pub const fn from_discriminator(word: Word) -> Option<Self> {
        match word {
            0 => Some(Self::Yield),
            1 => Some(Self::Sleep),
            3 => Some(Self::SyncCreate),
            4 => Some(Self::Sync),
            5 => Some(Self::Pend),
            _ => None,
        }
    }
}

/// Kind of kernel synchronization object.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// Plain rendezvous point
    Sync = 0,
    /// Signal carrying one value word
    Signal = 1,
    /// Counting semaphore
    Semaphore = 2,
    /// Ownership mutex
    Mutex = 3,
}

impl SyncKind {
    /// Look up a kind word.
    pub const fn from_word(word: Word) -> Option<Self> {
        match word {
            0 => Some(Self::Sync),
            1 => Some(Self::Signal),
            2 => Some(Self::Semaphore),
            3 => Some(Self::Mutex),
            _ => None,
        }
    }

    /// Kind word as carried in slot 2.
    #[inline]
    pub const fn word(self) -> Word {
        self as Word
    }
}

/// Wait bound for [`KernelOp::Pend`].
///
/// The kernel reads the timeout word as a signed count: `-1` waits forever
/// and any other negative word is rejected. Durations are therefore capped
/// at [`Timeout::MAX_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Give up after this many milliseconds.
    Duration(u32),
    /// Wait until signalled.
    #[default]
    Forever,
}

impl Timeout {
    /// Word carried across the trap for [`Timeout::Forever`].
    pub const FOREVER_WORD: Word = u32::MAX;

    /// Longest bounded wait the kernel accepts.
    pub const MAX_MS: u32 = i32::MAX as u32;

    /// Timeout of `ms` milliseconds, capped at [`Timeout::MAX_MS`].
    pub const fn from_ms(ms: u32) -> Self {
        if ms > Self::MAX_MS {
            Self::Duration(Self::MAX_MS)
        } else {
            Self::Duration(ms)
        }
    }

    /// Timeout of whole seconds, capped at [`Timeout::MAX_MS`].
    pub const fn from_seconds(seconds: u32) -> Self {
        Self::from_ms(seconds.saturating_mul(1000))
    }

    /// Encode as a hand-off word (`Forever` is `-1`).
    ///
    /// A hand-built `Duration` above [`Timeout::MAX_MS`] is sent as
    /// `MAX_MS`, so a bounded wait never reaches the kernel as unbounded.
    pub const fn to_word(self) -> Word {
        match self {
            Self::Duration(ms) if ms > Self::MAX_MS => Self::MAX_MS,
            Self::Duration(ms) => ms,
            Self::Forever => Self::FOREVER_WORD,
        }
    }

    /// Decode a hand-off word.
    ///
    /// Returns None for negative words other than `-1`.
    pub const fn from_word(word: Word) -> Option<Self> {
        match word {
            Self::FOREVER_WORD => Some(Self::Forever),
            ms if ms <= Self::MAX_MS => Some(Self::Duration(ms)),
            _ => None,
        }
    }

    /// Bound in milliseconds, or None for no bound.
    pub const fn as_ms(self) -> Option<u32> {
        match self {
            Self::Duration(ms) => Some(ms),
            Self::Forever => None,
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration(ms) => write!(f, "{}ms", ms),
            Self::Forever => f.write_str("forever"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminators() {
        assert_eq!(KernelOp::Yield.discriminator(), 0);
        assert_eq!(KernelOp::Sleep.discriminator(), 1);
        assert_eq!(KernelOp::from_discriminator(2), None);
        for op in [KernelOp::SyncCreate, KernelOp::Sync, KernelOp::Pend] {
            assert_eq!(KernelOp::from_discriminator(op.discriminator()), Some(op));
        }
    }

    #[test]
    fn test_timeout_words() {
        assert_eq!(Timeout::Forever.to_word(), 0xFFFF_FFFF);
        assert_eq!(Timeout::from_word(0xFFFF_FFFF), Some(Timeout::Forever));
        assert_eq!(Timeout::from_ms(250).to_word(), 250);
        assert_eq!(Timeout::from_seconds(2), Timeout::Duration(2000));
        assert_eq!(Timeout::default(), Timeout::Forever);
    }

    #[test]
    fn test_long_timeouts_stay_bounded() {
        assert_eq!(Timeout::from_seconds(u32::MAX), Timeout::Duration(Timeout::MAX_MS));
        assert_eq!(Timeout::from_ms(u32::MAX), Timeout::Duration(Timeout::MAX_MS));
        assert_eq!(Timeout::from_ms(Timeout::MAX_MS).to_word(), 0x7FFF_FFFF);

        for ms in [Timeout::MAX_MS + 1, 0xFFFF_FFFE, u32::MAX] {
            assert_eq!(Timeout::Duration(ms).to_word(), Timeout::MAX_MS);
            assert_ne!(Timeout::Duration(ms).to_word(), Timeout::FOREVER_WORD);
        }
    }

    #[test]
    fn test_negative_timeout_words_are_rejected() {
        assert_eq!(Timeout::from_word(0x8000_0000), None);
        assert_eq!(Timeout::from_word(0xFFFF_FFFE), None);
        assert_eq!(Timeout::from_word(0x7FFF_FFFF), Some(Timeout::Duration(Timeout::MAX_MS)));
        assert_eq!(Timeout::from_word(0), Some(Timeout::Duration(0)));
    }
}
