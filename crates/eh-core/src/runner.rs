//! Runner contract: the pluggable action dispatcher.
//!
//! A runner is constructed once per process invocation with an option map
//! and turns a decided event into a shell command string. The pipeline
//! overlays the decided event's payload onto the runner's options before
//! asking for the command, so the payload can retarget a runner without the
//! runner knowing.

use thiserror::Error;

use eh_config::RunnerOpts;

use crate::event::DecidedEvent;

/// Errors raised while building a command from a decided event.
///
/// These surface as execution-exception failures; they never propagate out
/// of the pipeline.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("missing runner option {0}")]
    MissingOption(&'static str),

    #[error("command template references unknown key {0:?}")]
    UnknownTemplateKey(String),

    #[error("unterminated placeholder in command template")]
    UnterminatedPlaceholder,

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// A pluggable action dispatcher.
pub trait Runner {
    /// The runner's option map, every key a candidate for payload overlay.
    fn opts(&self) -> &RunnerOpts;

    fn opts_mut(&mut self) -> &mut RunnerOpts;

    /// Build the shell command for a complete, non-discarded event.
    ///
    /// Returning an empty string is treated as a non-compliant
    /// implementation by the pipeline.
    fn build_command(&mut self, event: &DecidedEvent) -> Result<String, RunnerError>;

    /// Session setup hook for runners that hold a connection around
    /// execution. Wrap slow connects in
    /// [`run_with_deadline`](crate::deadline::run_with_deadline).
    fn connect(&mut self) -> Result<(), RunnerError> {
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), RunnerError> {
        Ok(())
    }

    /// Whether the pipeline should log the terminal summary line.
    ///
    /// A runner that writes its own terminal log line reports `false` here
    /// for the remainder of its lifetime to avoid duplicate reporting.
    fn logs_summary(&self) -> bool {
        true
    }
}
