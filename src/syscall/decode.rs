//! Request Decoding
//!
//! The handler's side of the register convention: turn a trapped selector
//! and r0-r3 into a typed [`Request`]. The resident kernel (or a host stub)
//! dispatches on the result.
//!
//! # Rules
//! - Unknown selectors and unknown discriminators decode to `None`; the
//!   handler should answer [`Errno::Enosys`]
//! - Malformed operands (unknown sync kind, negative timeout other than
//!   `-1`) also decode to `None`
//! - Addresses are left as raw words until [`IoRequest::span`] checks them

use super::args::{SyscallArgs, Word};
use super::class::SyscallClass;
use super::io::IoOp;
use super::kernel::{KernelOp, SyncKind, Timeout, DISCRIMINATOR_SLOT};
use super::result::{Errno, SyscallResult};
use super::validate::{validate_span, Bounds, Span, SpanError};

/// A fully decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Diagnostic pass-through.
    Test(SyscallArgs),
    /// Kernel service.
    Kernel(KernelRequest),
    /// I/O on a caller buffer.
    Io(IoRequest),
    /// Device request, interpreted by the driver.
    Driver(SyscallArgs),
}

/// Decoded kernel sub-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelRequest {
    Yield,
    Sleep { ms: u32 },
    SyncCreate { kind: SyncKind, init: u32, max: u32 },
    Sync { kobj: i32, kind: SyncKind, value: u32 },
    Pend { kobj: i32, kind: SyncKind, timeout: Timeout },
}

/// Decoded I/O request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoRequest {
    pub op: IoOp,
    pub addr: Word,
    pub len: Word,
    pub extra: Word,
}

impl Request {
    /// Decode a trap entry.
    pub fn decode(class: SyscallClass, args: SyscallArgs) -> Option<Self> {
        match class {
            SyscallClass::Test => Some(Self::Test(args)),
            SyscallClass::Kernel => KernelRequest::decode(args).map(Self::Kernel),
            SyscallClass::Io => IoRequest::decode(args).map(Self::Io),
            SyscallClass::Driver => Some(Self::Driver(args)),
        }
    }

    /// Decode starting from the raw `svc` immediate.
    pub fn decode_selector(selector: u8, args: SyscallArgs) -> Option<Self> {
        SyscallClass::from_selector(selector).and_then(|class| Self::decode(class, args))
    }

    /// The class this request travels on.
    pub const fn class(&self) -> SyscallClass {
        match self {
            Self::Test(_) => SyscallClass::Test,
            Self::Kernel(_) => SyscallClass::Kernel,
            Self::Io(_) => SyscallClass::Io,
            Self::Driver(_) => SyscallClass::Driver,
        }
    }
}

impl KernelRequest {
    fn decode(args: SyscallArgs) -> Option<Self> {
        let [r0, _, r2, r3] = args.words();
        let op = KernelOp::from_discriminator(args.slot(DISCRIMINATOR_SLOT))?;

        Some(match op {
            KernelOp::Yield => Self::Yield,
            KernelOp::Sleep => Self::Sleep { ms: r0 },
            KernelOp::SyncCreate => Self::SyncCreate {
                kind: SyncKind::from_word(r2)?,
                init: r0,
                max: r3,
            },
            KernelOp::Sync => Self::Sync {
                kobj: r0 as i32,
                kind: SyncKind::from_word(r2)?,
                value: r3,
            },
            KernelOp::Pend => Self::Pend {
                kobj: r0 as i32,
                kind: SyncKind::from_word(r2)?,
                timeout: Timeout::from_word(r3)?,
            },
        })
    }
}

impl IoRequest {
    fn decode(args: SyscallArgs) -> Option<Self> {
        let [addr, len, op, extra] = args.words();
        Some(Self {
            op: IoOp::from_word(op)?,
            addr,
            len,
            extra,
        })
    }

    /// Check the buffer against the memory the caller may hand over.
    ///
    /// # Arguments
    /// * `bounds` - The calling task's accessible range
    ///
    /// # Returns
    /// * `Ok(Span)` - The buffer lies entirely inside `bounds`
    /// * `Err(SpanError)` - Null, wrapping or out-of-bounds buffer; answer
    ///   with [`SpanError::errno`]
    pub fn span(&self, bounds: Bounds) -> Result<Span, SpanError> {
        validate_span(self.addr, self.len, bounds)
    }
}

/// Dispatch a raw trap entry to `handle`, answering `-ENOSYS` for anything
/// that does not decode.
pub fn dispatch<F>(selector: u8, args: SyscallArgs, handle: F) -> SyscallResult
where
    F: FnOnce(Request) -> SyscallResult,
{
    match Request::decode_selector(selector, args) {
        Some(request) => handle(request),
        None => {
            log::debug!("unknown syscall: svc #{} {:?}", selector, args);
            SyscallResult::from_errno(Errno::Enosys)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syscall::gateway::Gateway;
    use crate::syscall::trap::Trap;

    /// Host handler built on the decoder.
    #[derive(Default)]
    struct DecodingHandler {
        last: Option<Request>,
    }

    impl Trap for DecodingHandler {
        fn trap(&mut self, class: SyscallClass, args: SyscallArgs) -> SyscallResult {
            dispatch(class.selector(), args, |request| {
                self.last = Some(request);
                SyscallResult::from_raw(0)
            })
        }
    }

    #[test]
    fn test_gateway_and_decoder_agree() {
        let mut gw = Gateway::new(DecodingHandler::default());

        gw.yield_now();
        assert_eq!(gw.backend().last, Some(Request::Kernel(KernelRequest::Yield)));

        gw.sleep(100);
        assert_eq!(
            gw.backend().last,
            Some(Request::Kernel(KernelRequest::Sleep { ms: 100 }))
        );

        gw.semaphore_create(2, 8);
        assert_eq!(
            gw.backend().last,
            Some(Request::Kernel(KernelRequest::SyncCreate {
                kind: SyncKind::Semaphore,
                init: 2,
                max: 8,
            }))
        );

        gw.pend(3, SyncKind::Mutex, Timeout::Forever);
        assert_eq!(
            gw.backend().last,
            Some(Request::Kernel(KernelRequest::Pend {
                kobj: 3,
                kind: SyncKind::Mutex,
                timeout: Timeout::Forever,
            }))
        );

        gw.print("hi");
        match gw.backend().last {
            Some(Request::Io(io)) => {
                assert_eq!(io.op, IoOp::Print);
                assert_eq!(io.len, 2);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_requests_are_enosys() {
        let mut gw = Gateway::new(DecodingHandler::default());
        assert_eq!(gw.kernel(2, 0, 0, 0).raw(), Errno::Enosys.raw());
        // SAFETY: zero length, no memory handed over
        assert_eq!(unsafe { gw.io(0, 0, 77, 0) }.raw(), Errno::Enosys.raw());
        assert!(gw.backend().last.is_none());

        assert_eq!(
            dispatch(9, SyscallArgs::ZERO, |_| SyscallResult::from_raw(0)).raw(),
            -38
        );
    }

    #[test]
    fn test_bad_sync_kind_is_rejected() {
        let args = SyscallArgs::new([0, KernelOp::SyncCreate.discriminator(), 9, 0]);
        assert_eq!(Request::decode(SyscallClass::Kernel, args), None);
    }

    #[test]
    fn test_long_pend_reaches_handler_bounded() {
        let mut gw = Gateway::new(DecodingHandler::default());

        gw.pend(1, SyncKind::Sync, Timeout::from_seconds(u32::MAX));
        assert_eq!(
            gw.backend().last,
            Some(Request::Kernel(KernelRequest::Pend {
                kobj: 1,
                kind: SyncKind::Sync,
                timeout: Timeout::Duration(Timeout::MAX_MS),
            }))
        );

        gw.pend(1, SyncKind::Sync, Timeout::Duration(u32::MAX));
        match gw.backend().last {
            Some(Request::Kernel(KernelRequest::Pend { timeout, .. })) => {
                assert_ne!(timeout, Timeout::Forever);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_negative_timeout_word_is_enosys() {
        let args = SyscallArgs::new([1, KernelOp::Pend.discriminator(), 0, 0x8000_0000]);
        assert_eq!(Request::decode(SyscallClass::Kernel, args), None);

        let mut gw = Gateway::new(DecodingHandler::default());
        assert_eq!(gw.kernel(KernelOp::Pend.discriminator(), 1, 0, 0xFFFF_FFFE).raw(), -38);
    }

    /// Handler that validates print buffers against one task's memory.
    struct BoundedPrinter {
        bounds: Bounds,
    }

    impl Trap for BoundedPrinter {
        fn trap(&mut self, class: SyscallClass, args: SyscallArgs) -> SyscallResult {
            dispatch(class.selector(), args, |request| match request {
                Request::Io(io) => match io.span(self.bounds) {
                    Ok(span) => SyscallResult::from_raw(span.len() as i32),
                    Err(err) => err.into(),
                },
                _ => SyscallResult::from_errno(Errno::Enosys),
            })
        }
    }

    #[test]
    fn test_io_buffers_checked_against_caller_bounds() {
        let bounds = Bounds::new(0x2000_0000, 0x2000_0100).unwrap();
        let mut gw = Gateway::new(BoundedPrinter { bounds });
        let print = IoOp::Print.word();

        // SAFETY: the handler only inspects the words, never the memory
        unsafe {
            assert_eq!(gw.io(0x2000_0000, 16, print, 0).raw(), 16);
            assert_eq!(gw.io(0x2000_00F0, 16, print, 0).raw(), 16);
            assert_eq!(gw.io(0x2000_00F1, 16, print, 0).raw(), Errno::Efault.raw());
            assert_eq!(gw.io(0, 16, print, 0).raw(), Errno::Efault.raw());
            assert_eq!(gw.io(u32::MAX - 4, 16, print, 0).raw(), Errno::Efault.raw());
            assert_eq!(gw.io(0, 0, print, 0).raw(), 0);
        }
    }

    #[test]
    fn test_opaque_classes() {
        let args = SyscallArgs::new([1, 2, 3, 4]);
        assert_eq!(Request::decode_selector(0, args), Some(Request::Test(args)));
        assert_eq!(Request::decode_selector(3, args), Some(Request::Driver(args)));
        assert_eq!(Request::Driver(args).class(), SyscallClass::Driver);
    }
}
