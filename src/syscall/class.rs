//! Syscall Classes
//!
//! The trap immediate selects one of four handler classes. The selector
//! space is fixed and shared with the privileged handler; reassigning a
//! value is an ABI break on both sides.

use core::fmt;

/// Top-level syscall class, encoded as the `svc` immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SyscallClass {
    /// Diagnostic pass-through.
    Test = 0,
    /// Scheduler and synchronization services.
    Kernel = 1,
    /// Console and peripheral I/O on caller-owned regions.
    Io = 2,
    /// Device-specific requests.
    Driver = 3,
}

impl SyscallClass {
    /// Every class, in selector order.
    pub const ALL: [Self; 4] = [Self::Test, Self::Kernel, Self::Io, Self::Driver];

    /// The `svc` immediate for this class.
    #[inline]
    pub const fn selector(self) -> u8 {
        self as u8
    }

    /// Map a selector read back from a trapped instruction.
    ///
    /// Only handlers need this; callers always start from the enum.
    #[inline]
    pub const fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            0 => Some(Self::Test),
            1 => Some(Self::Kernel),
            2 => Some(Self::Io),
            3 => Some(Self::Driver),
            _ => None,
        }
    }

    /// Short lowercase name, used in trace output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Kernel => "kernel",
            Self::Io => "io",
            Self::Driver => "driver",
        }
    }
}

impl fmt::Display for SyscallClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(svc #{})", self.name(), self.selector())
    }
}
