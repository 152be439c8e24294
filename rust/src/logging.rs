//! Verbosity-gated logging for the allocators.
//!
//! Output goes to stderr and costs nothing beyond an integer compare when the
//! configured verbosity is below the macro's level:
//! - 0: SILENT
//! - 1: CHANGES (task placements, workstations opened, reconciliation commits)
//! - 2: CHECKS (fit decisions, candidate workstations and their increases)
//! - 3: DEBUG (frontier contents on every step)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!("[ergoline] {}", format_args!($($arg)*));
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!("[ergoline]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[ergoline]     {}", format_args!($($arg)*));
        }
    };
}
