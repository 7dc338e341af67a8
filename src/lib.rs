//! svcgate - Supervisor-Call Gateway for 32-bit ARM
//!
//! Unprivileged application code reaches the resident kernel through a
//! single `svc` instruction whose immediate picks one of four classes.
//!
//! # Contract
//! - Selector: `svc #0` test, `#1` kernel, `#2` io, `#3` driver
//! - Arguments: exactly four words in r0-r3, unused slots zero
//! - Result: one signed word in r0, returned verbatim
//! - Blocking: control returns only after the handler completes
//!
//! # Layout
//! - `syscall`: marshalling, trap backends, per-class library, and the
//!   handler's decoding of the same registry
//! - `region`: `.bss` / `.noinit` buffers handed over by address/length
//! - `console`: formatted output and a `log` backend over the I/O class
//! - `user`: free-function syscalls over the hardware trap (ARM only)
//!
//! # Architecture
//! - Target: ARMv7-M / ARMv7-A, 32-bit
//! - Host builds compile everything except the `svc` backend, for tests

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod console;
pub mod region;
pub mod syscall;
#[cfg(target_arch = "arm")]
pub mod user;

pub use region::{Retained, StaticRegion, Zeroed};
pub use syscall::{Gateway, SyscallArgs, SyscallClass, SyscallResult, Trap};
