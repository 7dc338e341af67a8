//! Address/Length Validation
//!
//! The gateway forwards I/O addresses without looking at them. These
//! checks are for the handler side, before it touches caller memory;
//! decoded requests reach them through
//! [`IoRequest::span`](super::decode::IoRequest::span).
//!
//! # Checks
//! - Zero-length spans are always valid
//! - Null start is rejected
//! - `addr + len` must not overflow
//! - The whole span must lie inside the caller's bounds

use core::fmt;

use super::args::Word;
use super::result::{Errno, SyscallResult};

/// Half-open range of memory a caller may hand over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    start: Word,
    end: Word,
}

impl Bounds {
    /// Bounds `[start, end)`.
    ///
    /// Returns None if `start > end`.
    pub const fn new(start: Word, end: Word) -> Option<Self> {
        if start > end {
            None
        } else {
            Some(Self { start, end })
        }
    }

    /// Start of the range.
    pub const fn start(&self) -> Word {
        self.start
    }

    /// One past the end of the range.
    pub const fn end(&self) -> Word {
        self.end
    }
}

/// Why a span was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanError {
    /// Non-empty span starting at address zero.
    Null,
    /// `addr + len` wraps the address space.
    Overflow,
    /// Some byte lies outside the caller's bounds.
    OutOfBounds,
}

impl SpanError {
    /// Kernel error code to return to the caller.
    pub const fn errno(self) -> Errno {
        Errno::Efault
    }
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null buffer"),
            Self::Overflow => f.write_str("buffer wraps address space"),
            Self::OutOfBounds => f.write_str("buffer outside caller memory"),
        }
    }
}

impl From<SpanError> for SyscallResult {
    fn from(err: SpanError) -> Self {
        SyscallResult::from_errno(err.errno())
    }
}

/// A span that passed [`validate_span`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    addr: Word,
    len: Word,
}

impl Span {
    /// Start address.
    pub const fn addr(&self) -> Word {
        self.addr
    }

    /// Length in bytes.
    pub const fn len(&self) -> Word {
        self.len
    }

    /// Check whether the span is empty.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View the span as bytes.
    ///
    /// # Safety
    /// The bounds used for validation must describe memory mapped and
    /// readable by the handler, and the caller must not modify it while
    /// the slice is alive.
    #[cfg(target_pointer_width = "32")]
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: non-null, in bounds and non-wrapping per validate_span;
        // mapping and aliasing are the caller's contract.
        unsafe { core::slice::from_raw_parts(self.addr as usize as *const u8, self.len as usize) }
    }
}

/// Validate a caller-supplied address/length pair.
pub fn validate_span(addr: Word, len: Word, bounds: Bounds) -> Result<Span, SpanError> {
    if len == 0 {
        return Ok(Span { addr, len: 0 });
    }

    if addr == 0 {
        return Err(SpanError::Null);
    }

    let end = addr.checked_add(len).ok_or(SpanError::Overflow)?;

    if addr < bounds.start || end > bounds.end {
        return Err(SpanError::OutOfBounds);
    }

    Ok(Span { addr, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: Bounds = match Bounds::new(0x2000_0000, 0x2000_8000) {
        Some(bounds) => bounds,
        None => panic!("bad bounds"),
    };

    #[test]
    fn test_zero_length() {
        assert!(validate_span(0, 0, USER).is_ok());
        assert!(validate_span(0xFFFF_FFF0, 0, USER).unwrap().is_empty());
    }

    #[test]
    fn test_null_pointer() {
        assert_eq!(validate_span(0, 32, USER), Err(SpanError::Null));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(validate_span(u32::MAX - 10, 100, USER), Err(SpanError::Overflow));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(validate_span(0x2000_0000, 32, USER).map(|s| s.len()), Ok(32));
        assert!(validate_span(0x2000_7FE0, 32, USER).is_ok());
        assert_eq!(validate_span(0x2000_7FE1, 32, USER), Err(SpanError::OutOfBounds));
        assert_eq!(validate_span(0x1FFF_FFFF, 1, USER), Err(SpanError::OutOfBounds));
        assert_eq!(Bounds::new(2, 1), None);
    }

    #[test]
    fn test_errno_mapping() {
        let result: SyscallResult = SpanError::OutOfBounds.into();
        assert_eq!(result.raw(), -14);
    }
}
