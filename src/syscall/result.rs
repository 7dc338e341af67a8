//! Syscall Results and Error Codes
//!
//! The handler writes one signed word back into r0. Its meaning belongs to
//! the operation: the gateway hands it back untouched. Callers that follow
//! the kernel's negative-errno convention can opt in to
//! [`SyscallResult::into_result`].

use core::fmt;

/// Error codes reported by the resident kernel.
///
/// Values are negated POSIX errno numbers, as written into r0.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Operation not permitted
    Eperm = -1,
    /// No such entry
    Enoent = -2,
    /// No such thread
    Esrch = -3,
    /// Interrupted call
    Eintr = -4,
    /// I/O error
    Eio = -5,
    /// No such device or address
    Enxio = -6,
    /// Bad descriptor
    Ebadf = -9,
    /// Try again / would block
    Eagain = -11,
    /// Out of memory
    Enomem = -12,
    /// Permission denied
    Eacces = -13,
    /// Bad address
    Efault = -14,
    /// Device or resource busy
    Ebusy = -16,
    /// No such device
    Enodev = -19,
    /// Invalid argument
    Einval = -22,
    /// Resource deadlock would occur
    Edeadlk = -35,
    /// Function not implemented
    Enosys = -38,
    /// Timed out
    Etimedout = -116,
    /// Operation not supported
    Enotsup = -524,
}

impl Errno {
    /// Alias used by non-blocking acquisitions.
    pub const EWOULDBLOCK: Self = Self::Eagain;

    /// Match a raw result word against the registry.
    pub const fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            -1 => Self::Eperm,
            -2 => Self::Enoent,
            -3 => Self::Esrch,
            -4 => Self::Eintr,
            -5 => Self::Eio,
            -6 => Self::Enxio,
            -9 => Self::Ebadf,
            -11 => Self::Eagain,
            -12 => Self::Enomem,
            -13 => Self::Eacces,
            -14 => Self::Efault,
            -16 => Self::Ebusy,
            -19 => Self::Enodev,
            -22 => Self::Einval,
            -35 => Self::Edeadlk,
            -38 => Self::Enosys,
            -116 => Self::Etimedout,
            -524 => Self::Enotsup,
            _ => return None,
        })
    }

    /// The word a handler writes back for this error.
    #[inline]
    pub const fn raw(self) -> i32 {
        self as i32
    }

    /// Human-readable description.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eperm => "operation not permitted",
            Self::Enoent => "no such entry",
            Self::Esrch => "no such thread",
            Self::Eintr => "interrupted call",
            Self::Eio => "I/O error",
            Self::Enxio => "no such device or address",
            Self::Ebadf => "bad descriptor",
            Self::Eagain => "try again",
            Self::Enomem => "out of memory",
            Self::Eacces => "permission denied",
            Self::Efault => "bad address",
            Self::Ebusy => "device or resource busy",
            Self::Enodev => "no such device",
            Self::Einval => "invalid argument",
            Self::Edeadlk => "resource deadlock would occur",
            Self::Enosys => "function not implemented",
            Self::Etimedout => "timed out",
            Self::Enotsup => "operation not supported",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.raw())
    }
}

/// A result word whose errno does not appear in [`Errno`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultError {
    /// A registered kernel error.
    Known(Errno),
    /// Negative word in the errno range with no registry entry.
    Unknown(i32),
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(errno) => fmt::Display::fmt(errno, f),
            Self::Unknown(raw) => write!(f, "unknown error ({})", raw),
        }
    }
}

/// Lowest word still treated as an errno by [`SyscallResult::into_result`].
pub const ERRNO_MIN: i32 = -4095;

/// The signed word returned in r0.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SyscallResult(i32);

impl SyscallResult {
    /// Wrap a raw r0 value.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Wrap a kernel error code.
    #[inline]
    pub const fn from_errno(errno: Errno) -> Self {
        Self(errno.raw())
    }

    /// The word exactly as the handler wrote it.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// The same bits read as unsigned.
    #[inline]
    pub const fn as_word(self) -> u32 {
        self.0 as u32
    }

    /// Check whether the word lies in the errno range.
    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 < 0 && self.0 >= ERRNO_MIN
    }

    /// Interpret the word with the negative-errno convention.
    ///
    /// Words outside `[-4095, -1]` are success values and come back as
    /// their unsigned bit pattern.
    pub const fn into_result(self) -> Result<u32, ResultError> {
        if !self.is_error() {
            return Ok(self.0 as u32);
        }
        match Errno::from_raw(self.0) {
            Some(errno) => Err(ResultError::Known(errno)),
            None => Err(ResultError::Unknown(self.0)),
        }
    }
}

impl From<Errno> for SyscallResult {
    fn from(errno: Errno) -> Self {
        Self::from_errno(errno)
    }
}

impl From<SyscallResult> for i32 {
    fn from(result: SyscallResult) -> Self {
        result.0
    }
}

impl fmt::Debug for SyscallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyscallResult({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_is_untouched() {
        for raw in [0, 1, 42, -1, -38, i32::MIN, i32::MAX] {
            assert_eq!(SyscallResult::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn test_into_result() {
        assert_eq!(SyscallResult::from_raw(42).into_result(), Ok(42));
        assert_eq!(
            SyscallResult::from_raw(-38).into_result(),
            Err(ResultError::Known(Errno::Enosys))
        );
        assert_eq!(
            SyscallResult::from_raw(-7).into_result(),
            Err(ResultError::Unknown(-7))
        );
        // Large negative words are values, e.g. a high address
        assert_eq!(
            SyscallResult::from_raw(i32::MIN).into_result(),
            Ok(0x8000_0000)
        );
    }

    #[test]
    fn test_errno_registry_roundtrip() {
        for errno in [Errno::Eperm, Errno::Efault, Errno::Etimedout, Errno::Enotsup] {
            assert_eq!(Errno::from_raw(errno.raw()), Some(errno));
        }
        assert_eq!(Errno::from_raw(0), None);
        assert_eq!(Errno::EWOULDBLOCK, Errno::Eagain);
    }
}
