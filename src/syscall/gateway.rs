//! Syscall Gateway
//!
//! [`Gateway`] is the only way to reach a [`Trap`]. It exposes one facade
//! per syscall class, so callers never build a selector or a slot layout
//! by hand.
//!
//! # Guarantees
//! - Every call is one trap, issued exactly once, never retried
//! - Argument words reach the handler unchanged and in slot order
//! - The result word comes back unchanged
//! - Stores before the call are visible to the handler, and handler
//!   stores are visible after the call returns

use core::sync::atomic::{compiler_fence, Ordering};

use log::trace;

use super::args::{IntoWord, SyscallArgs, Word};
use super::class::SyscallClass;
use super::io::IoOp;
use super::kernel::{KernelOp, SyncKind, Timeout};
use super::result::SyscallResult;
use super::trap::Trap;
use crate::region::{Placement, RegionGuard};

/// Log target for per-trap tracing.
pub const TRAP_TARGET: &str = "svcgate::trap";

/// Class-aware front end over a trap backend.
///
/// The backend goes in at construction and never comes back out by value
/// or by `&mut`, so a hardware backend cannot be driven around the class
/// operations and their safety contracts:
///
/// ```compile_fail
/// use svcgate::{Gateway, Trap};
///
/// fn take_backend<T: Trap>(gateway: Gateway<T>) -> T {
///     gateway.into_backend()
/// }
/// ```
///
/// ```compile_fail
/// use svcgate::{Gateway, SyscallArgs, SyscallClass, Trap};
///
/// fn raw_trap<T: Trap>(gateway: &mut Gateway<T>) {
///     gateway.backend_mut().trap(SyscallClass::Io, SyscallArgs::ZERO);
/// }
/// ```
///
/// Host stubs are inspected through [`Gateway::backend`]:
///
/// ```
/// use svcgate::{Gateway, SyscallArgs, SyscallClass, SyscallResult, Trap};
///
/// #[derive(Default)]
/// struct Counter {
///     calls: u32,
/// }
///
/// impl Trap for Counter {
///     fn trap(&mut self, _class: SyscallClass, args: SyscallArgs) -> SyscallResult {
///         self.calls += 1;
///         SyscallResult::from_raw(args.slot(0) as i32)
///     }
/// }
///
/// let mut gateway = Gateway::new(Counter::default());
/// assert_eq!(gateway.test(SyscallArgs::pack([7])).raw(), 7);
/// assert_eq!(gateway.backend().calls, 1);
/// ```
#[derive(Debug, Default)]
pub struct Gateway<T: Trap> {
    backend: T,
}

#[cfg(target_arch = "arm")]
impl Gateway<super::trap::Svc> {
    /// Gateway over the hardware `svc` instruction.
    #[inline]
    pub const fn svc() -> Self {
        Self::new(super::trap::Svc::new())
    }
}

impl<T: Trap> Gateway<T> {
    /// Wrap a trap backend.
    #[inline]
    pub const fn new(backend: T) -> Self {
        Self { backend }
    }

    /// Borrow the backend.
    #[inline]
    pub fn backend(&self) -> &T {
        &self.backend
    }

    /// Issue one trap.
    fn invoke(&mut self, class: SyscallClass, args: SyscallArgs) -> SyscallResult {
        trace!(target: TRAP_TARGET, "{} <- {:?}", class, args);

        compiler_fence(Ordering::SeqCst);
        let result = self.backend.trap(class, args);
        compiler_fence(Ordering::SeqCst);

        trace!(target: TRAP_TARGET, "{} -> {}", class, result.raw());
        result
    }

    // ---------------------------------------------------------------------
    // Test class
    // ---------------------------------------------------------------------

    /// Diagnostic pass-through: four opaque words in, one word out.
    pub fn test(&mut self, args: SyscallArgs) -> SyscallResult {
        self.invoke(SyscallClass::Test, args)
    }

    // ---------------------------------------------------------------------
    // Kernel class
    // ---------------------------------------------------------------------

    /// Raw kernel sub-operation.
    ///
    /// `discriminator` lands in slot 1, `operand` in slot 0. Use this for
    /// sub-operations the typed methods below do not cover.
    pub fn kernel(
        &mut self,
        discriminator: Word,
        operand: Word,
        arg2: Word,
        arg3: Word,
    ) -> SyscallResult {
        self.invoke(
            SyscallClass::Kernel,
            SyscallArgs::new([operand, discriminator, arg2, arg3]),
        )
    }

    fn kernel_op(&mut self, op: KernelOp, operand: Word, arg2: Word, arg3: Word) -> SyscallResult {
        self.kernel(op.discriminator(), operand, arg2, arg3)
    }

    /// Give up the rest of the current time slice.
    ///
    /// Blocks until the scheduler resumes the caller.
    pub fn yield_now(&mut self) -> SyscallResult {
        self.kernel_op(KernelOp::Yield, 0, 0, 0)
    }

    /// Suspend the caller for at least `duration_ms` milliseconds.
    pub fn sleep(&mut self, duration_ms: u32) -> SyscallResult {
        self.kernel_op(KernelOp::Sleep, duration_ms, 0, 0)
    }

    /// Create a kernel synchronization object.
    ///
    /// On success the result is the new object's handle.
    pub fn sync_create(&mut self, kind: SyncKind, init: u32, max: u32) -> SyscallResult {
        self.kernel_op(KernelOp::SyncCreate, init, kind.word(), max)
    }

    /// Create a plain rendezvous object.
    pub fn sync_object_create(&mut self) -> SyscallResult {
        self.sync_create(SyncKind::Sync, 0, 0)
    }

    /// Create a signal object.
    pub fn signal_create(&mut self) -> SyscallResult {
        self.sync_create(SyncKind::Signal, 0, 0)
    }

    /// Create a counting semaphore.
    pub fn semaphore_create(&mut self, init: u32, max: u32) -> SyscallResult {
        self.sync_create(SyncKind::Semaphore, init, max)
    }

    /// Create a mutex.
    pub fn mutex_create(&mut self) -> SyscallResult {
        self.sync_create(SyncKind::Mutex, 0, 0)
    }

    /// Release or notify `kobj`. `value` is the signal payload.
    pub fn sync(&mut self, kobj: i32, kind: SyncKind, value: u32) -> SyscallResult {
        self.kernel_op(KernelOp::Sync, kobj.into_word(), kind.word(), value)
    }

    /// Wait on `kobj` for at most `timeout`.
    ///
    /// # Arguments
    /// * `kobj` - Handle returned by [`Gateway::sync_create`] (slot 0)
    /// * `kind` - Kind the object was created with (slot 2)
    /// * `timeout` - Wait bound (slot 3); durations above
    ///   [`Timeout::MAX_MS`] are sent as `MAX_MS`
    ///
    /// # Returns
    /// The kernel's r0, unchanged.
    pub fn pend(&mut self, kobj: i32, kind: SyncKind, timeout: Timeout) -> SyscallResult {
        self.kernel_op(KernelOp::Pend, kobj.into_word(), kind.word(), timeout.to_word())
    }

    // ---------------------------------------------------------------------
    // I/O class
    // ---------------------------------------------------------------------

    /// Raw I/O request on the buffer at `addr`.
    ///
    /// # Arguments
    /// * `addr` - Start of the caller buffer (slot 0)
    /// * `len` - Buffer length in bytes (slot 1)
    /// * `op` - I/O operation word, see [`IoOp`] (slot 2)
    /// * `extra` - Operation-specific word (slot 3)
    ///
    /// # Returns
    /// The handler's r0, unchanged. A negative errno-range word usually
    /// means the handler rejected the buffer; see
    /// [`SyscallResult::into_result`].
    ///
    /// # Safety
    /// 1. `addr..addr + len` is memory the caller owns for the whole call
    /// 2. Nothing else reads or writes it until the call returns
    /// 3. The handler may read or write all of it, so it must be writable
    ///    unless `op` is known to only read
    ///
    /// The gateway forwards both words without inspecting them.
    pub unsafe fn io(&mut self, addr: Word, len: Word, op: Word, extra: Word) -> SyscallResult {
        self.invoke(SyscallClass::Io, SyscallArgs::new([addr, len, op, extra]))
    }

    /// I/O request on a locked static region.
    ///
    /// # Arguments
    /// * `region` - Guard over the buffer; its address and full length
    ///   go in slots 0 and 1
    /// * `op` - I/O operation word (slot 2)
    /// * `extra` - Operation-specific word (slot 3)
    ///
    /// # Returns
    /// The handler's r0, unchanged.
    ///
    /// # Security
    /// Safe because the guard's `&mut` borrow proves exclusive ownership of
    /// every byte the handler can reach, for longer than the trap lasts.
    pub fn io_region<const N: usize, P: Placement>(
        &mut self,
        region: &mut RegionGuard<'_, N, P>,
        op: Word,
        extra: Word,
    ) -> SyscallResult {
        // SAFETY:
        // - Address and length come from the region itself, never the caller
        // - The guard holds the region lock for the whole call
        // - The `&mut` borrow keeps local code off the bytes until return
        // Audited: 2026-10-16
        unsafe { self.io(region.addr(), region.len_word(), op, extra) }
    }

    /// Write `s` to the console.
    pub fn print(&mut self, s: &str) -> SyscallResult {
        // SAFETY: the handler only reads a print buffer, and `s` is
        // borrowed across the whole call.
        // Audited: 2026-10-16
        unsafe {
            self.io(
                s.as_ptr().into_word(),
                s.len().into_word(),
                IoOp::Print.word(),
                0,
            )
        }
    }

    // ---------------------------------------------------------------------
    // Driver class
    // ---------------------------------------------------------------------

    /// Device request; the handler interprets the words per device.
    ///
    /// # Arguments
    /// * `args` - Four device-defined words, delivered in slot order
    ///
    /// # Returns
    /// The driver's r0, unchanged.
    ///
    /// # Safety
    /// 1. Any word the device reads as an address must point at memory the
    ///    caller owns for the whole call
    /// 2. That memory must stay untouched by other code until return
    ///
    /// The gateway cannot tell addresses from values in this class.
    pub unsafe fn driver(&mut self, args: SyscallArgs) -> SyscallResult {
        self.invoke(SyscallClass::Driver, args)
    }
}
