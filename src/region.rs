//! Static Storage Regions
//!
//! Named, program-lifetime buffers that callers hand to the I/O and driver
//! classes by address and length.
//!
//! # Placement
//! - [`Zeroed`]: lives in `.bss`, reads as all-zero before any caller code
//!   runs
//! - [`Retained`]: lives in `.noinit`, keeps its content across a reset and
//!   is garbage on first boot
//!
//! # Ownership
//! The storage cell sits in the placement section; the lock that hands out
//! exclusive access lives beside it in ordinary memory, so a reset never
//! leaves a retained region locked. Declare regions with
//! [`static_region!`](crate::static_region), which keeps each cell private
//! to its one handle.
//!
//! ```ignore
//! svcgate::static_region! {
//!     static SCRATCH: Zeroed<32>;
//!     static BOOT_STATE: Retained<8>;
//! }
//! ```

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ops::{Deref, DerefMut};
use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};

use spin::{Mutex, MutexGuard};

use crate::syscall::args::{IntoWord, Word};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Zeroed {}
    impl Sealed for super::Retained {}
}

/// Placement category, as a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Zeroed,
    Retained,
}

/// Placement category of a region, fixed at build time.
pub trait Placement: sealed::Sealed + 'static {
    /// Runtime tag for this placement.
    const KIND: PlacementKind;
    /// Link section the loader treats accordingly.
    const SECTION: &'static str;
}

/// Zero-filled by the loader before caller code runs.
#[derive(Debug, Clone, Copy)]
pub struct Zeroed;

/// Left untouched across resets; uninitialized on first boot.
#[derive(Debug, Clone, Copy)]
pub struct Retained;

impl Placement for Zeroed {
    const KIND: PlacementKind = PlacementKind::Zeroed;
    const SECTION: &'static str = ".bss";
}

impl Placement for Retained {
    const KIND: PlacementKind = PlacementKind::Retained;
    const SECTION: &'static str = ".noinit";
}

/// Backing storage of a region.
#[repr(transparent)]
pub struct RegionCell<const N: usize, P: Placement> {
    bytes: UnsafeCell<MaybeUninit<[u8; N]>>,
    _placement: PhantomData<P>,
}

// SAFETY: all access goes through the single StaticRegion that wraps the
// cell, which serializes it with a lock.
unsafe impl<const N: usize, P: Placement> Sync for RegionCell<N, P> {}

impl<const N: usize> RegionCell<N, Zeroed> {
    /// All-zero storage.
    pub const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new(MaybeUninit::zeroed()),
            _placement: PhantomData,
        }
    }
}

impl<const N: usize> RegionCell<N, Retained> {
    /// Storage with no initial content.
    pub const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new(MaybeUninit::uninit()),
            _placement: PhantomData,
        }
    }
}

impl<const N: usize, P: Placement> RegionCell<N, P> {
    #[inline]
    fn as_mut_ptr(&self) -> *mut u8 {
        self.bytes.get().cast::<u8>()
    }
}

/// Error from a region write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
    /// The write would run past the end of the region.
    OutOfRange { offset: usize, len: usize, size: usize },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { offset, len, size } => write!(
                f,
                "write of {} bytes at offset {} exceeds region of {} bytes",
                len, offset, size
            ),
        }
    }
}

/// A named static buffer with exclusive, lock-guarded access.
pub struct StaticRegion<const N: usize, P: Placement> {
    cell: &'static RegionCell<N, P>,
    lock: Mutex<()>,
}

impl<const N: usize, P: Placement> StaticRegion<N, P> {
    /// Wrap a storage cell.
    ///
    /// Normally reached through [`static_region!`](crate::static_region),
    /// which hides the cell inside the region's initializer.
    ///
    /// # Arguments
    /// * `cell` - Backing storage, already placed in its linker section
    ///
    /// # Returns
    /// An unlocked region handle. The lock lives in the handle, not in
    /// the cell, so it is always reset at boot even for `.noinit` storage.
    ///
    /// # Safety
    /// 1. No other `StaticRegion` may wrap the same cell
    /// 2. Nothing else may read or write the cell directly
    ///
    /// Breaking either lets two owners hand the same bytes to the kernel.
    pub const unsafe fn new(cell: &'static RegionCell<N, P>) -> Self {
        Self {
            cell,
            lock: Mutex::new(()),
        }
    }

    /// Take exclusive ownership, spinning until it is free.
    ///
    /// # Returns
    /// A guard that is the only way to reach the bytes, or to pass them to
    /// [`Gateway::io_region`](crate::syscall::Gateway::io_region).
    pub fn lock(&self) -> RegionGuard<'_, N, P> {
        RegionGuard {
            cell: self.cell,
            _lock: self.lock.lock(),
        }
    }

    /// Take exclusive ownership if nobody holds it.
    pub fn try_lock(&self) -> Option<RegionGuard<'_, N, P>> {
        self.lock.try_lock().map(|lock| RegionGuard {
            cell: self.cell,
            _lock: lock,
        })
    }

    /// Address of the first byte as a hand-off word.
    pub fn addr(&self) -> Word {
        self.cell.as_mut_ptr().into_word()
    }

    /// Size in bytes.
    pub const fn len(&self) -> usize {
        N
    }

    /// Check whether the region has no bytes.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Placement category.
    pub const fn placement(&self) -> PlacementKind {
        P::KIND
    }
}

impl<const N: usize, P: Placement> fmt::Debug for StaticRegion<N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRegion")
            .field("addr", &format_args!("{:#010x}", self.addr()))
            .field("len", &N)
            .field("placement", &P::KIND)
            .field("section", &P::SECTION)
            .finish()
    }
}

/// Exclusive access to a region until dropped.
pub struct RegionGuard<'a, const N: usize, P: Placement> {
    cell: &'a RegionCell<N, P>,
    _lock: MutexGuard<'a, ()>,
}

impl<const N: usize, P: Placement> RegionGuard<'_, N, P> {
    /// Address of the first byte as a hand-off word.
    pub fn addr(&self) -> Word {
        self.cell.as_mut_ptr().into_word()
    }

    /// Size as a hand-off word.
    pub const fn len_word(&self) -> Word {
        N as Word
    }

    /// Size in bytes.
    pub const fn len(&self) -> usize {
        N
    }

    /// Check whether the region has no bytes.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Raw pointer to the first byte.
    pub fn as_ptr(&self) -> *const u8 {
        self.cell.as_mut_ptr()
    }

    /// Raw mutable pointer to the first byte.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.cell.as_mut_ptr()
    }

    /// Copy `bytes` into the region at `offset`.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), RegionError> {
        let end = offset.checked_add(bytes.len());
        if end.map_or(true, |end| end > N) {
            return Err(RegionError::OutOfRange {
                offset,
                len: bytes.len(),
                size: N,
            });
        }
        // SAFETY: [offset, offset + len) is inside the region and the guard
        // holds the only access path to it.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.as_mut_ptr().add(offset), bytes.len());
        }
        Ok(())
    }

    /// Set every byte to `byte`.
    pub fn fill(&mut self, byte: u8) {
        // SAFETY: writes exactly N bytes of a region we exclusively hold
        unsafe { ptr::write_bytes(self.as_mut_ptr(), byte, N) }
    }

    /// Zero the region with volatile stores that survive optimization.
    ///
    /// Use before releasing a region that carried sensitive data.
    pub fn scrub(&mut self) {
        let dst = self.as_mut_ptr();
        for i in 0..N {
            // SAFETY: i < N, region exclusively held
            unsafe { ptr::write_volatile(dst.add(i), 0) };
        }
        compiler_fence(Ordering::SeqCst);
    }
}

impl<const N: usize> Deref for RegionGuard<'_, N, Zeroed> {
    type Target = [u8; N];

    fn deref(&self) -> &[u8; N] {
        // SAFETY: a zeroed region starts fully initialized and every write
        // path stores initialized bytes.
        unsafe { &*self.cell.as_mut_ptr().cast::<[u8; N]>() }
    }
}

impl<const N: usize> DerefMut for RegionGuard<'_, N, Zeroed> {
    fn deref_mut(&mut self) -> &mut [u8; N] {
        // SAFETY: as in deref, plus exclusive access through the guard
        unsafe { &mut *self.cell.as_mut_ptr().cast::<[u8; N]>() }
    }
}

impl<const N: usize> RegionGuard<'_, N, Retained> {
    /// View the content as bytes.
    ///
    /// # Safety
    /// Every byte must have been written, in this run or before the last
    /// reset. On first boot the region is uninitialized.
    pub unsafe fn assume_init_ref(&self) -> &[u8; N] {
        // SAFETY: initialization is the caller's contract
        unsafe { &*self.cell.as_mut_ptr().cast::<[u8; N]>() }
    }

    /// Mutable view of the content.
    ///
    /// # Safety
    /// Same as [`assume_init_ref`](Self::assume_init_ref).
    pub unsafe fn assume_init_mut(&mut self) -> &mut [u8; N] {
        // SAFETY: initialization is the caller's contract
        unsafe { &mut *self.cell.as_mut_ptr().cast::<[u8; N]>() }
    }
}

/// Declare named static regions.
///
/// Each item expands to a private storage cell in the placement's link
/// section (on bare-metal targets) and a public-facing [`StaticRegion`]
/// handle.
#[macro_export]
macro_rules! static_region {
    () => {};

    (@item $section:literal, $placement:ident, $(#[$meta:meta])* $vis:vis $name:ident, $n:tt) => {
        $(#[$meta])*
        $vis static $name: $crate::region::StaticRegion<$n, $crate::region::$placement> = {
            #[cfg_attr(target_os = "none", link_section = $section)]
            static CELL: $crate::region::RegionCell<$n, $crate::region::$placement> =
                $crate::region::RegionCell::<$n, $crate::region::$placement>::new();

            // SAFETY: CELL is only nameable inside this initializer
            unsafe { $crate::region::StaticRegion::new(&CELL) }
        };
    };

    ($(#[$meta:meta])* $vis:vis static $name:ident: Zeroed<$n:tt>; $($rest:tt)*) => {
        $crate::static_region!(@item ".bss", Zeroed, $(#[$meta])* $vis $name, $n);
        $crate::static_region!($($rest)*);
    };

    ($(#[$meta:meta])* $vis:vis static $name:ident: Retained<$n:tt>; $($rest:tt)*) => {
        $crate::static_region!(@item ".noinit", Retained, $(#[$meta])* $vis $name, $n);
        $crate::static_region!($($rest)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOT_STATE_LEN: usize = 8;

    crate::static_region! {
        static SCRATCH: Zeroed<16>;
        static TX_BUF: Zeroed<4>;
        static PROBE: Zeroed<2>;
        /// Survives reset
        static BOOT_STATE: Retained<BOOT_STATE_LEN>;
    }

    #[test]
    fn test_zeroed_reads_zero_before_write() {
        let guard = SCRATCH.lock();
        assert_eq!(guard.len(), 16);
        assert!(guard.iter().all(|&b| b == 0));
        assert_eq!(SCRATCH.placement(), PlacementKind::Zeroed);
    }

    #[test]
    fn test_write_fill_scrub() {
        let mut guard = TX_BUF.lock();
        guard.write_at(1, b"ab").unwrap();
        assert_eq!(&*guard, &[0, b'a', b'b', 0]);

        assert_eq!(
            guard.write_at(3, b"xy"),
            Err(RegionError::OutOfRange { offset: 3, len: 2, size: 4 })
        );
        assert!(guard.write_at(usize::MAX, b"z").is_err());

        guard.fill(0xEE);
        assert_eq!(&*guard, &[0xEE; 4]);

        guard.scrub();
        assert_eq!(&*guard, &[0; 4]);
    }

    #[test]
    fn test_exclusive_ownership() {
        let guard = PROBE.lock();
        assert!(PROBE.try_lock().is_none());
        assert_eq!(guard.addr(), PROBE.addr());
        drop(guard);
        assert!(PROBE.try_lock().is_some());
    }

    #[test]
    fn test_retained_keeps_what_was_written() {
        {
            let mut guard = BOOT_STATE.lock();
            guard.write_at(0, &[0xA5, 0x5A, 0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02]).unwrap();
        }

        // Simulated reset: drop every handle, take the region again
        let guard = BOOT_STATE.lock();
        // SAFETY: fully written above
        let bytes = unsafe { guard.assume_init_ref() };
        assert_eq!(bytes, &[0xA5, 0x5A, 0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02]);
        assert_eq!(BOOT_STATE.placement(), PlacementKind::Retained);
        assert_eq!(guard.len_word(), BOOT_STATE_LEN as u32);
    }
}
