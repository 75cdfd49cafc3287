//! Eventhandler configuration loading and resolution.
//!
//! This crate provides:
//! - `RunnerOpts`: the option map every runner is constructed with
//! - `KEY=VALUE` pair parsing shared by `--runneropt` and `--eventopt`
//! - Path resolution (env → XDG fallback) for the per-runner log directory

pub mod opts;
pub mod resolve;

pub use opts::{parse_pairs, OptsError, RunnerOpts};
pub use resolve::ConfigPaths;
