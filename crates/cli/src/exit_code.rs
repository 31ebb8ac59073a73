//! Exit code definitions for filemover
//!
//! Scripts rely on these values. Per-file upload failures do not change the
//! exit code; only conditions that stop the run before the walk do.

use filemover_core::Error;

/// Exit codes for the filemover binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed, including runs with per-file failures
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// Invalid arguments, missing options, bad region or credentials,
    /// unreadable source path
    UsageError = 2,

    /// The storage client could not be initialized
    ClientNotInitialized = 99,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            99 => Some(Self::ClientNotInitialized),
            _ => None,
        }
    }

    /// Exit code for a fatal error
    pub const fn from_error(error: &Error) -> Self {
        match Self::from_i32(error.exit_code()) {
            Some(code) => code,
            None => Self::GeneralError,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::ClientNotInitialized => "Storage client not initialized",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
