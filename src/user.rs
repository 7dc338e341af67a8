//! Caller-Facing Syscalls
//!
//! Free functions over the hardware trap, for application code that does
//! not need to pick a backend. Each call is one blocking `svc`.

use crate::syscall::{Gateway, Svc, SyncKind, SyscallArgs, SyscallResult, Timeout, Word};

#[inline(always)]
fn gateway() -> Gateway<Svc> {
    Gateway::svc()
}

/// `svc #0`: four opaque words in, the handler's r0 out.
#[inline]
pub fn test(args: SyscallArgs) -> SyscallResult {
    gateway().test(args)
}

/// Give up the rest of the time slice.
#[inline]
pub fn yield_now() -> SyscallResult {
    gateway().yield_now()
}

/// Sleep for at least `ms` milliseconds.
#[inline]
pub fn sleep(ms: u32) -> SyscallResult {
    gateway().sleep(ms)
}

/// Raw kernel sub-operation; see [`Gateway::kernel`].
#[inline]
pub fn kernel(discriminator: Word, operand: Word, arg2: Word, arg3: Word) -> SyscallResult {
    gateway().kernel(discriminator, operand, arg2, arg3)
}

/// Create a synchronization object; the result is its handle.
#[inline]
pub fn sync_create(kind: SyncKind, init: u32, max: u32) -> SyscallResult {
    gateway().sync_create(kind, init, max)
}

/// Release or notify `kobj`.
#[inline]
pub fn sync(kobj: i32, kind: SyncKind, value: u32) -> SyscallResult {
    gateway().sync(kobj, kind, value)
}

/// Wait on `kobj`.
#[inline]
pub fn pend(kobj: i32, kind: SyncKind, timeout: Timeout) -> SyscallResult {
    gateway().pend(kobj, kind, timeout)
}

/// `svc #2` on a raw buffer.
///
/// # Safety
/// See [`Gateway::io`].
#[inline]
pub unsafe fn io(addr: Word, len: Word, op: Word, extra: Word) -> SyscallResult {
    // SAFETY: forwarded caller contract
    unsafe { gateway().io(addr, len, op, extra) }
}

/// Write `s` to the console.
#[inline]
pub fn print(s: &str) -> SyscallResult {
    gateway().print(s)
}

/// `svc #3` device request.
///
/// # Safety
/// See [`Gateway::driver`].
#[inline]
pub unsafe fn driver(args: SyscallArgs) -> SyscallResult {
    // SAFETY: forwarded caller contract
    unsafe { gateway().driver(args) }
}
