//! Process executor: runs the decided command and captures its outcome.
//!
//! The shell-interpretation semantics of the command string belong to the
//! executor, not the pipeline. The default executor hands the string to
//! `sh -c` and blocks until the command finishes; no timeout is applied
//! here (a runner that wants one wraps its own work in the deadline
//! harness).

use std::process::Command;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Errors while launching a command. A command that runs and exits nonzero
/// is not an error here; that is reported through [`CommandOutput`].
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn shell for command: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Captured result of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; -1 when the command died on a signal.
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a command string and captures stdout, stderr, and the exit code.
pub trait ProcessExecutor {
    fn run(&self, command: &str) -> Result<CommandOutput, ExecError>;
}

/// Default executor: `sh -c <command>`, blocking.
#[derive(Debug, Default)]
pub struct ShellExecutor;

impl ProcessExecutor for ShellExecutor {
    fn run(&self, command: &str) -> Result<CommandOutput, ExecError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(ExecError::Spawn)?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Canned executor (used for tests and scaffolding): returns a fixed
/// output and records every command it was asked to run.
#[derive(Debug, Clone)]
pub struct StaticExecutor {
    output: CommandOutput,
    commands: Arc<Mutex<Vec<String>>>,
}

impl StaticExecutor {
    pub fn exiting(exit_code: i32) -> Self {
        StaticExecutor {
            output: CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code,
            },
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_output(mut self, stdout: &str, stderr: &str) -> Self {
        self.output.stdout = stdout.to_string();
        self.output.stderr = stderr.to_string();
        self
    }

    /// Handle onto the recorded command list, valid across clones.
    pub fn commands(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.commands)
    }
}

impl ProcessExecutor for StaticExecutor {
    fn run(&self, command: &str) -> Result<CommandOutput, ExecError> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.to_string());
        }
        Ok(self.output.clone())
    }
}
