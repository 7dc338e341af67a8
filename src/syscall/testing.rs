//! Recording Stub Handler
//!
//! A [`Trap`] that stands in for the privileged handler on the host. It
//! records every entry (selector and four words) and answers with a
//! configurable responder, by default an echo of slot 0.

use super::args::SyscallArgs;
use super::class::SyscallClass;
use super::result::SyscallResult;
use super::trap::Trap;

/// One observed trap entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapEntry {
    /// The `svc` immediate the handler saw.
    pub selector: u8,
    /// r0-r3 as the handler saw them.
    pub args: SyscallArgs,
}

/// Computes the r0 reply for an entry.
pub type Responder = fn(&TrapEntry) -> i32;

fn echo_first_slot(entry: &TrapEntry) -> i32 {
    entry.args.slot(0) as i32
}

/// Fixed-capacity recording handler.
///
/// Entries past `CAP` are counted in [`dropped`](Self::dropped) but not
/// stored; the responder still runs for them.
#[derive(Debug)]
pub struct RecordingTrap<const CAP: usize> {
    entries: [TrapEntry; CAP],
    len: usize,
    dropped: usize,
    responder: Responder,
}

impl<const CAP: usize> RecordingTrap<CAP> {
    const EMPTY: TrapEntry = TrapEntry {
        selector: 0,
        args: SyscallArgs::ZERO,
    };

    /// Recorder that echoes slot 0.
    pub const fn new() -> Self {
        Self::with_responder(echo_first_slot)
    }

    /// Recorder with a custom reply.
    pub const fn with_responder(responder: Responder) -> Self {
        Self {
            entries: [Self::EMPTY; CAP],
            len: 0,
            dropped: 0,
            responder,
        }
    }

    /// Recorded entries, oldest first.
    pub fn entries(&self) -> &[TrapEntry] {
        &self.entries[..self.len]
    }

    /// Most recent recorded entry.
    pub fn last(&self) -> Option<&TrapEntry> {
        self.entries().last()
    }

    /// Number of entries that did not fit.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }
}

impl<const CAP: usize> Default for RecordingTrap<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Trap for RecordingTrap<CAP> {
    fn trap(&mut self, class: SyscallClass, args: SyscallArgs) -> SyscallResult {
        let entry = TrapEntry {
            selector: class.selector(),
            args,
        };
        if self.len < CAP {
            self.entries[self.len] = entry;
            self.len += 1;
        } else {
            self.dropped += 1;
        }
        SyscallResult::from_raw((self.responder)(&entry))
    }
}
