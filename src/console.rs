//! Console Output over the I/O Class
//!
//! Formatted text for unprivileged code, written through the kernel's
//! `Print` operation instead of a device register.
//!
//! # Pieces
//! - [`Console`]: `core::fmt::Write` on top of a [`Gateway`]
//! - `CONSOLE` / `uprint!` / `uprintln!`: the global console (ARM only)
//! - [`ConsoleLogger`]: a `log` backend that writes records to a console
//!
//! Trap tracing (target `svcgate::trap`) is never routed to a console: it
//! would re-enter the trap being traced.

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

use crate::syscall::gateway::{Gateway, TRAP_TARGET};
use crate::syscall::trap::Trap;

/// Text sink backed by the I/O print operation.
#[derive(Debug)]
pub struct Console<T: Trap> {
    gateway: Gateway<T>,
}

impl<T: Trap> Console<T> {
    /// Console over a gateway.
    pub const fn new(gateway: Gateway<T>) -> Self {
        Self { gateway }
    }

    /// Borrow the underlying gateway.
    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }
}

impl<T: Trap> Write for Console<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if s.is_empty() {
            return Ok(());
        }
        if self.gateway.print(s).is_error() {
            return Err(fmt::Error);
        }
        Ok(())
    }
}

/// Global console over the hardware trap.
#[cfg(target_arch = "arm")]
pub static CONSOLE: Mutex<Console<crate::syscall::trap::Svc>> =
    Mutex::new(Console::new(Gateway::svc()));

/// Print to the global console.
#[cfg(target_arch = "arm")]
#[macro_export]
macro_rules! uprint {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let mut console = $crate::console::CONSOLE.lock();
        let _ = write!(console, $($arg)*);
    }};
}

/// Print a line to the global console.
#[cfg(target_arch = "arm")]
#[macro_export]
macro_rules! uprintln {
    () => {
        $crate::uprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::uprint!($($arg)*);
        $crate::uprint!("\n");
    }};
}

/// `log` backend writing `[LEVEL] target: message` lines to a console.
pub struct ConsoleLogger<T: Trap + Send + 'static> {
    console: &'static Mutex<Console<T>>,
    level: LevelFilter,
}

impl<T: Trap + Send + 'static> ConsoleLogger<T> {
    /// Logger over `console`, passing records up to `level`.
    pub const fn new(console: &'static Mutex<Console<T>>, level: LevelFilter) -> Self {
        Self { console, level }
    }

    /// Install as the global logger.
    ///
    /// Fails if a logger is already installed.
    pub fn init(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.level);
        Ok(())
    }
}

impl<T: Trap + Send + 'static> Log for ConsoleLogger<T> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level && metadata.target() != TRAP_TARGET
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut console = self.console.lock();
        let _ = writeln!(
            console,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Logger over the global console.
#[cfg(target_arch = "arm")]
pub static LOGGER: ConsoleLogger<crate::syscall::trap::Svc> =
    ConsoleLogger::new(&CONSOLE, LevelFilter::Info);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syscall::io::IoOp;
    use crate::syscall::result::Errno;
    use crate::syscall::testing::RecordingTrap;
    use crate::syscall::SyscallClass;
    use log::Level;

    fn reply_len(entry: &crate::syscall::testing::TrapEntry) -> i32 {
        entry.args.slot(1) as i32
    }

    static SINK: Mutex<Console<RecordingTrap<32>>> = Mutex::new(Console::new(Gateway::new(
        RecordingTrap::with_responder(reply_len),
    )));
    static LOGGER: ConsoleLogger<RecordingTrap<32>> = ConsoleLogger::new(&SINK, LevelFilter::Info);

    #[test]
    fn test_write_goes_through_print() {
        let mut console = Console::new(Gateway::new(RecordingTrap::<8>::with_responder(reply_len)));
        write!(console, "value={}", 42).unwrap();
        console.write_str("").unwrap();

        let entries = console.gateway().backend().entries();
        assert!(!entries.is_empty());
        for entry in entries {
            assert_eq!(entry.selector, SyscallClass::Io.selector());
            assert_eq!(entry.args.slot(2), IoOp::Print.word());
        }
        let total: u32 = entries.iter().map(|e| e.args.slot(1)).sum();
        assert_eq!(total as usize, "value=42".len());
    }

    #[test]
    fn test_handler_error_surfaces_as_fmt_error() {
        let mut console = Console::new(Gateway::new(RecordingTrap::<1>::with_responder(|_| {
            Errno::Eio.raw()
        })));
        assert!(console.write_str("x").is_err());
    }

    #[test]
    fn test_logger_formats_and_filters() {
        LOGGER.log(
            &Record::builder()
                .level(Level::Info)
                .target("app")
                .args(format_args!("booted in {}ms", 12))
                .build(),
        );
        LOGGER.log(
            &Record::builder()
                .level(Level::Error)
                .target(TRAP_TARGET)
                .args(format_args!("ignored"))
                .build(),
        );
        LOGGER.log(
            &Record::builder()
                .level(Level::Debug)
                .target("app")
                .args(format_args!("ignored"))
                .build(),
        );

        let console = SINK.lock();
        let total: u32 = console
            .gateway()
            .backend()
            .entries()
            .iter()
            .map(|e| e.args.slot(1))
            .sum();
        assert_eq!(total as usize, "[INFO] app: booted in 12ms\n".len());
    }
}
