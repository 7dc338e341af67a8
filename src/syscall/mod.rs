//! Supervisor Call Interface
//!
//! Lets unprivileged code request services from the resident kernel
//! through a single trap instruction, multiplexed into four classes.
//!
//! # Layers
//! - [`args`]: the four hand-off words and width adjustment
//! - [`trap`]: the backend that crosses the privilege boundary
//! - [`gateway`]: one facade per class, the only path to a trap
//! - [`kernel`], [`io`]: sub-operation registries
//! - [`decode`], [`validate`]: the handler's view of the same contract
//!
//! # Classes
//! - `svc #0`: test(a0, a1, a2, a3) - diagnostic pass-through
//! - `svc #1`: kernel - yield, sleep, synchronization objects
//! - `svc #2`: io(addr, len, op, extra) - buffer I/O, console print
//! - `svc #3`: driver(a0, a1, a2, a3) - device requests

pub mod args;
pub mod class;
pub mod decode;
pub mod gateway;
pub mod io;
pub mod kernel;
pub mod result;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod trap;
pub mod validate;

pub use args::{IntoWord, SyscallArgs, Word};
pub use class::SyscallClass;
pub use gateway::Gateway;
pub use io::IoOp;
pub use kernel::{KernelOp, SyncKind, Timeout};
pub use result::{Errno, ResultError, SyscallResult};
#[cfg(target_arch = "arm")]
pub use trap::Svc;
pub use trap::Trap;
