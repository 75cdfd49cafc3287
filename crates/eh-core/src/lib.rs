//! Eventhandler core: the event decision-and-execution pipeline.
//!
//! A raw monitoring event goes through one `handle` call: a pluggable
//! decider policy prepares or discards it, the runner builds a command
//! from the decided event, the executor runs it, and the pipeline
//! classifies and logs the outcome.
//!
//! - **event**: the [`DecidedEvent`](event::DecidedEvent) value object
//! - **decider** / **runner**: the pluggable capability traits
//! - **pipeline**: orchestration and outcome accounting
//! - **registry**: name-based resolution of implementations
//! - **exec**: subprocess execution with captured output
//! - **deadline**: wall-clock bound for runner-chosen work
//! - **environment**: host/site/timestamp injection
//! - **logging** / **exit_codes**: process surface

pub mod deadline;
pub mod decider;
pub mod deciders;
pub mod environment;
pub mod event;
pub mod exec;
pub mod exit_codes;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod runner;
pub mod runners;

pub use deadline::{run_with_deadline, DeadlineError};
pub use decider::{Decider, DeciderContext, DeciderError};
pub use event::{DecidedEvent, EventOpts};
pub use exec::{CommandOutput, ProcessExecutor, ShellExecutor};
pub use exit_codes::ExitCode;
pub use pipeline::{DropReason, EventOutcome, ExecutionReport, Pipeline};
pub use registry::{Registry, RegistryError};
pub use runner::{Runner, RunnerError};
