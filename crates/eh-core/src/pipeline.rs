//! Pipeline orchestration: raw event in, one terminal outcome out.
//!
//! States: `Received → Deciding → {Discarded | Dropped | Decided} →
//! Executing → {Succeeded | Failed}`. Decide-phase errors never leave
//! `handle`; they degrade to a dropped event plus one critical log line.
//! Execute-phase errors degrade to a failed outcome. The caller only ever
//! sees an [`EventOutcome`].
//!
//! A human operator reading the log sees exactly one line per terminal
//! event outcome (discard, drop, success, or failure), with enough detail
//! to diagnose without re-running.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use eh_common::EventId;

use crate::decider::DeciderContext;
use crate::environment::{inject_environment, EnvironmentProvider};
use crate::event::{DecidedEvent, EventOpts};
use crate::exec::ProcessExecutor;
use crate::registry::{Registry, RegistryError};
use crate::runner::Runner;

/// Why a decide-phase event was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    /// The decider raised; the error text was logged.
    DeciderFailed { error: String },
    /// The decider left a non-discarded event without payload or summary.
    Incomplete,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::DeciderFailed { error } => write!(f, "decider failed: {error}"),
            DropReason::Incomplete => write!(f, "decided event missing payload or summary"),
        }
    }
}

/// Captured detail of one executed (or attempted) command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// The command handed to the executor; `None` when building it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub stdout: String,
    pub stderr: String,
    /// Exit code of the command; `None` when it never launched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Error text when building or launching the command raised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    pub summary: String,
}

/// Terminal state of one handled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// The decider chose not to act; trivially successful.
    Discarded {
        silent: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
    },
    /// The decide phase failed; no command was considered.
    Dropped { reason: DropReason },
    /// A command was built and its execution attempted.
    Executed {
        success: bool,
        report: ExecutionReport,
    },
}

impl EventOutcome {
    /// Per-event success signal. Discards and drops are failure-free
    /// no-ops; only an executed command can fail.
    pub fn is_success(&self) -> bool {
        match self {
            EventOutcome::Discarded { .. } | EventOutcome::Dropped { .. } => true,
            EventOutcome::Executed { success, .. } => *success,
        }
    }
}

/// One runner, one decider policy, one event per `handle` call.
pub struct Pipeline {
    registry: Registry,
    runner: Box<dyn Runner>,
    runner_name: String,
    decider_name: String,
    environment: Box<dyn EnvironmentProvider>,
    executor: Box<dyn ProcessExecutor>,
}

impl Pipeline {
    /// Wire up a pipeline. The decider name is resolved once here so an
    /// unknown name fails at startup, not per event; the factory is still
    /// invoked freshly for every event.
    pub fn new(
        registry: Registry,
        runner: Box<dyn Runner>,
        runner_name: impl Into<String>,
        decider_name: impl Into<String>,
        environment: Box<dyn EnvironmentProvider>,
        executor: Box<dyn ProcessExecutor>,
    ) -> Result<Self, RegistryError> {
        let runner_name = runner_name.into();
        let decider_name = decider_name.into();
        registry.resolve_decider(&decider_name)?;
        Ok(Pipeline {
            registry,
            runner,
            runner_name,
            decider_name,
            environment,
            executor,
        })
    }

    /// Handle one raw event to its terminal state.
    pub fn handle(&mut self, mut raw_event: EventOpts) -> EventOutcome {
        let event_id = EventId::new();
        inject_environment(&mut raw_event, self.environment.as_ref());

        let event = match self.decide_and_prepare_event(raw_event, &event_id) {
            Ok(event) => event,
            Err(reason) => return EventOutcome::Dropped { reason },
        };

        if event.is_discarded() {
            // Discard wins over completeness; a discarded-but-incomplete
            // event is not a policy error.
            if event.is_discarded_silently() {
                return EventOutcome::Discarded {
                    silent: true,
                    summary: None,
                };
            }
            let summary = match event.summary() {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => Value::Object(event.eventopts().clone()).to_string(),
            };
            info!(event_id = %event_id, "discarded: {}", summary);
            return EventOutcome::Discarded {
                silent: false,
                summary: Some(summary),
            };
        }

        if !event.is_complete() {
            error!(
                event_id = %event_id,
                "a decided event must have the attributes payload and summary"
            );
            return EventOutcome::Dropped {
                reason: DropReason::Incomplete,
            };
        }

        if let Some(payload) = event.payload() {
            self.runner.opts_mut().overlay(payload);
        }

        let (success, report) = self.run_decided(&event, &event_id);
        EventOutcome::Executed { success, report }
    }

    fn decide_and_prepare_event(
        &self,
        raw_event: EventOpts,
        event_id: &EventId,
    ) -> Result<DecidedEvent, DropReason> {
        let raw_rendering = Value::Object(raw_event.clone()).to_string();
        let factory = match self.registry.resolve_decider(&self.decider_name) {
            Ok(factory) => factory,
            Err(err) => {
                error!(
                    event_id = %event_id,
                    "raw event {} caused error {}", raw_rendering, err
                );
                return Err(DropReason::DeciderFailed {
                    error: err.to_string(),
                });
            }
        };
        let decider = factory();
        let mut event = DecidedEvent::new(raw_event);
        let ctx = DeciderContext {
            runner: self.runner_name.clone(),
        };
        match decider.decide_and_prepare(&ctx, &mut event) {
            Ok(()) => Ok(event),
            Err(err) => {
                error!(
                    event_id = %event_id,
                    "when deciding based on this {} with this {} there was an error <{}>",
                    raw_rendering, self.decider_name, err
                );
                Err(DropReason::DeciderFailed {
                    error: err.to_string(),
                })
            }
        }
    }

    fn run_decided(&mut self, event: &DecidedEvent, event_id: &EventId) -> (bool, ExecutionReport) {
        let summary = event.summary().unwrap_or_default().to_string();
        let mut report = ExecutionReport {
            summary: summary.clone(),
            ..Default::default()
        };
        let mut success = false;

        match self.runner.build_command(event) {
            Ok(command) if command.is_empty() => {
                report.exception = Some("runner did not return a command".to_string());
            }
            Ok(command) => {
                debug!(event_id = %event_id, "command is {}", command);
                match self.executor.run(&command) {
                    Ok(output) => {
                        success = output.success();
                        report.stdout = output.stdout;
                        report.stderr = output.stderr;
                        report.exit_code = Some(output.exit_code);
                    }
                    Err(err) => report.exception = Some(err.to_string()),
                }
                report.command = Some(command);
            }
            Err(err) => report.exception = Some(err.to_string()),
        }

        if success {
            if self.runner.logs_summary() {
                info!(event_id = %event_id, "{}", summary);
                debug!(
                    event_id = %event_id,
                    "stdout {}, stderr {}", report.stdout, report.stderr
                );
            }
        } else if !report.stderr.is_empty() {
            error!(
                event_id = %event_id,
                "run failed: stdout {}, stderr {}, event {}",
                report.stdout, report.stderr, summary
            );
        } else if let Some(exception) = &report.exception {
            error!(
                event_id = %event_id,
                "run failed: exception <{}>, event was <{}>", exception, summary
            );
        } else if self.runner.logs_summary() {
            error!(
                event_id = %event_id,
                "run failed: stdout {}, stderr {}, exitcode {}, event {}",
                report.stdout,
                report.stderr,
                report.exit_code.unwrap_or(-1),
                summary
            );
        }

        (success, report)
    }

    /// The runner, for post-handle inspection.
    pub fn runner(&self) -> &dyn Runner {
        self.runner.as_ref()
    }
}
