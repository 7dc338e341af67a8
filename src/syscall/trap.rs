//! Trap Backends
//!
//! A [`Trap`] moves one request across the privilege boundary and brings
//! back the handler's result word. On ARM the backend is [`Svc`], which
//! issues the real supervisor call; host tests plug in a stub handler.
//!
//! # Hand-off
//! - Selector: the `svc` immediate (0..=3)
//! - Arguments: r0-r3, loaded from [`SyscallArgs`] in slot order
//! - Result: r0, written by the handler before exception return

use super::args::SyscallArgs;
use super::class::SyscallClass;
use super::result::SyscallResult;

/// Something that can carry a request to the privileged handler.
///
/// Implementations must deliver all four words unchanged and in slot
/// order, and must not return until the handler has produced its result.
pub trait Trap {
    /// Transfer control to the handler for `class` and wait for its result.
    fn trap(&mut self, class: SyscallClass, args: SyscallArgs) -> SyscallResult;
}

impl<T: Trap + ?Sized> Trap for &mut T {
    #[inline]
    fn trap(&mut self, class: SyscallClass, args: SyscallArgs) -> SyscallResult {
        (**self).trap(class, args)
    }
}

/// Hardware supervisor-call backend.
///
/// Works from thread mode at either privilege level; from handler mode
/// the `svc` escalates to HardFault on ARMv7-M. Only obtainable through
/// [`Gateway::svc`](super::gateway::Gateway::svc).
#[cfg(target_arch = "arm")]
#[derive(Debug)]
pub struct Svc {
    _private: (),
}

#[cfg(target_arch = "arm")]
impl Svc {
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }
}

/// Issue `svc #imm` with r0-r3 loaded from a [`SyscallArgs`].
///
/// The asm is not `nomem`: all prior stores are ordered before the trap and
/// all later loads after it. The handler writes r0 only; r1-r3 are still
/// marked clobbered.
#[cfg(target_arch = "arm")]
macro_rules! svc {
    ($imm:literal, $args:expr) => {{
        let [mut r0, r1, r2, r3] = $args.words();
        core::arch::asm!(
            concat!("svc #", $imm),
            inlateout("r0") r0,
            inlateout("r1") r1 => _,
            inlateout("r2") r2 => _,
            inlateout("r3") r3 => _,
            options(nostack),
        );
        r0 as i32
    }};
}

#[cfg(target_arch = "arm")]
impl Trap for Svc {
    #[inline]
    fn trap(&mut self, class: SyscallClass, args: SyscallArgs) -> SyscallResult {
        // SAFETY: argument words only reach Svc through the class library,
        // whose operations each document the memory they hand over.
        // Audited: 2026-10-16
        let raw = unsafe {
            match class {
                SyscallClass::Test => svc!(0, args),
                SyscallClass::Kernel => svc!(1, args),
                SyscallClass::Io => svc!(2, args),
                SyscallClass::Driver => svc!(3, args),
            }
        };
        SyscallResult::from_raw(raw)
    }
}

