//! Exit codes for the eventhandler CLI.
//!
//! Exit codes communicate the event outcome without requiring output
//! parsing. Discards and drops are failure-free no-ops; they still get
//! distinct codes so operators can tell them from an executed command.

use crate::pipeline::EventOutcome;

/// Exit codes for eventhandler invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command executed successfully
    Success = 0,

    /// Decider discarded the event; nothing executed
    Discarded = 1,

    /// Command executed and failed
    ExecFailed = 2,

    /// Decide phase dropped the event (policy bug, see log)
    PolicyDropped = 3,

    /// Configuration or registry error
    ConfigError = 10,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success | ExitCode::Discarded)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Map a terminal event outcome to its exit code.
    pub fn from_outcome(outcome: &EventOutcome) -> Self {
        match outcome {
            EventOutcome::Discarded { .. } => ExitCode::Discarded,
            EventOutcome::Dropped { .. } => ExitCode::PolicyDropped,
            EventOutcome::Executed { success: true, .. } => ExitCode::Success,
            EventOutcome::Executed { success: false, .. } => ExitCode::ExecFailed,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
