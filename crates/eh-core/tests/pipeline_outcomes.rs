//! End-to-end tests for the event pipeline state machine.

use serde_json::{json, Map, Value};

use eh_config::RunnerOpts;
use eh_core::decider::{Decider, DeciderContext, DeciderError};
use eh_core::environment::StaticEnvironment;
use eh_core::event::{DecidedEvent, EventOpts};
use eh_core::exec::{ExecError, ProcessExecutor, StaticExecutor};
use eh_core::pipeline::{DropReason, EventOutcome, Pipeline};
use eh_core::registry::{Registry, RegistryError};
use eh_core::runner::{Runner, RunnerError};
use eh_core::runners::ShellRunner;

fn raw(pairs: &[(&str, Value)]) -> EventOpts {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Pages oncall whenever the (normalized) state is critical.
struct PagingDecider;

impl Decider for PagingDecider {
    fn decide_and_prepare(
        &self,
        _ctx: &DeciderContext,
        event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        if event.eventopts().get("state") == Some(&json!(2)) {
            let mut payload = Map::new();
            payload.insert("contact".into(), json!("oncall"));
            event.set_payload(payload);
            event.set_summary("CPU CRIT -> paging oncall");
        } else {
            event.discard(true);
        }
        Ok(())
    }
}

struct SilentDiscardDecider;

impl Decider for SilentDiscardDecider {
    fn decide_and_prepare(
        &self,
        _ctx: &DeciderContext,
        event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        event.discard(true);
        Ok(())
    }
}

struct LoudDiscardDecider;

impl Decider for LoudDiscardDecider {
    fn decide_and_prepare(
        &self,
        _ctx: &DeciderContext,
        event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        event.set_summary("maintenance window, not acting");
        event.discard(false);
        Ok(())
    }
}

struct FailingDecider;

impl Decider for FailingDecider {
    fn decide_and_prepare(
        &self,
        _ctx: &DeciderContext,
        _event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        Err(DeciderError::Policy("no contact group for host".into()))
    }
}

struct IncompleteDecider;

impl Decider for IncompleteDecider {
    fn decide_and_prepare(
        &self,
        _ctx: &DeciderContext,
        _event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        Ok(())
    }
}

/// Discards loudly after wiping the summary, without ever setting a payload.
struct DiscardWithoutSummaryDecider;

impl Decider for DiscardWithoutSummaryDecider {
    fn decide_and_prepare(
        &self,
        _ctx: &DeciderContext,
        event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        event.set_summary("");
        event.discard(false);
        Ok(())
    }
}

/// Summarizes the environment-derived fields so tests can observe them.
struct EnvProbeDecider;

impl Decider for EnvProbeDecider {
    fn decide_and_prepare(
        &self,
        ctx: &DeciderContext,
        event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        let opts = event.eventopts();
        event.set_summary(format!(
            "{} {} {} {} via {}",
            opts["omd_site"],
            opts["omd_originating_host"],
            opts["omd_originating_fqdn"],
            opts["omd_originating_timestamp"],
            ctx.runner,
        ));
        event.set_payload(Map::new());
        Ok(())
    }
}

struct EmptyCommandRunner {
    opts: RunnerOpts,
}

impl Runner for EmptyCommandRunner {
    fn opts(&self) -> &RunnerOpts {
        &self.opts
    }

    fn opts_mut(&mut self) -> &mut RunnerOpts {
        &mut self.opts
    }

    fn build_command(&mut self, _event: &DecidedEvent) -> Result<String, RunnerError> {
        Ok(String::new())
    }
}

struct BrokenExecutor;

impl ProcessExecutor for BrokenExecutor {
    fn run(&self, _command: &str) -> Result<eh_core::exec::CommandOutput, ExecError> {
        Err(ExecError::Spawn(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "sh: not found",
        )))
    }
}

fn registry_with<D>(name: &str, factory: D) -> Registry
where
    D: Fn() -> Box<dyn Decider> + Send + Sync + 'static,
{
    let mut registry = Registry::with_builtins();
    registry.register_decider(name, factory).unwrap();
    registry
}

fn shell_runner(opt_pairs: &[&str]) -> Box<dyn Runner> {
    Box::new(ShellRunner::new(
        RunnerOpts::from_pairs(opt_pairs.iter().copied()).unwrap(),
    ))
}

fn pipeline(
    registry: Registry,
    runner: Box<dyn Runner>,
    decider: &str,
    executor: Box<dyn ProcessExecutor>,
) -> Pipeline {
    Pipeline::new(
        registry,
        runner,
        "notify",
        decider,
        Box::new(StaticEnvironment::default()),
        executor,
    )
    .unwrap()
}

// ── end-to-end success path ─────────────────────────────────────────

#[test]
fn critical_event_pages_oncall() {
    let registry = registry_with("paging", || Box::new(PagingDecider));
    let runner = shell_runner(&[
        "command_template=notify.sh {contact} \"{service_description} {output}\"",
        "contact=nobody",
    ]);
    let executor = StaticExecutor::exiting(0);
    let commands = executor.commands();
    let mut pipeline = pipeline(registry, runner, "paging", Box::new(executor));

    let outcome = pipeline.handle(raw(&[
        ("service_description", json!("CPU")),
        ("state", json!("2")),
        ("output", json!("CRIT")),
    ]));

    match &outcome {
        EventOutcome::Executed { success, report } => {
            assert!(*success);
            assert_eq!(report.summary, "CPU CRIT -> paging oncall");
            assert_eq!(report.exit_code, Some(0));
        }
        other => panic!("expected executed outcome, got {other:?}"),
    }
    assert!(outcome.is_success());
    assert_eq!(
        commands.lock().unwrap().as_slice(),
        [r#"notify.sh oncall "CPU CRIT""#]
    );
}

#[test]
fn payload_overlays_existing_attributes_only() {
    struct WidePayloadDecider;
    impl Decider for WidePayloadDecider {
        fn decide_and_prepare(
            &self,
            _ctx: &DeciderContext,
            event: &mut DecidedEvent,
        ) -> Result<(), DeciderError> {
            let mut payload = Map::new();
            payload.insert("contact".into(), json!("oncall"));
            payload.insert("not_an_option".into(), json!("ignored"));
            event.set_payload(payload);
            event.set_summary("s");
            Ok(())
        }
    }

    let registry = registry_with("wide", || Box::new(WidePayloadDecider));
    let runner = shell_runner(&["command_template=notify.sh {contact}", "contact=nobody"]);
    let mut pipeline = pipeline(
        registry,
        runner,
        "wide",
        Box::new(StaticExecutor::exiting(0)),
    );

    pipeline.handle(raw(&[]));

    let opts = pipeline.runner().opts();
    assert_eq!(opts.get_str("contact").as_deref(), Some("oncall"));
    assert!(!opts.contains_key("not_an_option"));
}

// ── discard paths ───────────────────────────────────────────────────

#[test]
fn silent_discard_executes_nothing() {
    let registry = registry_with("silent", || Box::new(SilentDiscardDecider));
    let runner = shell_runner(&["command_template=true"]);
    let executor = StaticExecutor::exiting(0);
    let commands = executor.commands();
    let mut pipeline = pipeline(registry, runner, "silent", Box::new(executor));

    let outcome = pipeline.handle(raw(&[("state", json!("0"))]));

    assert_eq!(
        outcome,
        EventOutcome::Discarded {
            silent: true,
            summary: None
        }
    );
    assert!(commands.lock().unwrap().is_empty());
}

#[test]
fn loud_discard_reports_the_summary() {
    let registry = registry_with("loud", || Box::new(LoudDiscardDecider));
    let runner = shell_runner(&["command_template=true"]);
    let mut pipeline = pipeline(
        registry,
        runner,
        "loud",
        Box::new(StaticExecutor::exiting(0)),
    );

    let outcome = pipeline.handle(raw(&[]));

    assert_eq!(
        outcome,
        EventOutcome::Discarded {
            silent: false,
            summary: Some("maintenance window, not acting".into())
        }
    );
}

#[test]
fn loud_discard_without_summary_falls_back_to_the_raw_event() {
    let registry = registry_with("nosummary", || Box::new(DiscardWithoutSummaryDecider));
    let runner = shell_runner(&["command_template=true"]);
    let mut pipeline = pipeline(
        registry,
        runner,
        "nosummary",
        Box::new(StaticExecutor::exiting(0)),
    );

    let outcome = pipeline.handle(raw(&[("state", json!("2"))]));

    match outcome {
        EventOutcome::Discarded {
            silent: false,
            summary: Some(summary),
        } => {
            assert!(summary.contains("state"));
            assert!(summary.contains("omd_site"));
        }
        other => panic!("expected loud discard, got {other:?}"),
    }
}

#[test]
fn discarded_incomplete_is_not_policy_error() {
    // Discard takes priority; completeness is only checked for
    // non-discarded events.
    let registry = registry_with("nosummary", || Box::new(DiscardWithoutSummaryDecider));
    let runner = shell_runner(&["command_template=true"]);
    let mut pipeline = pipeline(
        registry,
        runner,
        "nosummary",
        Box::new(StaticExecutor::exiting(0)),
    );

    let outcome = pipeline.handle(raw(&[]));

    assert!(matches!(outcome, EventOutcome::Discarded { .. }));
}

// ── dropped paths ───────────────────────────────────────────────────

#[test]
fn decider_error_drops_the_event() {
    let registry = registry_with("failing", || Box::new(FailingDecider));
    let runner = shell_runner(&["command_template=true"]);
    let executor = StaticExecutor::exiting(0);
    let commands = executor.commands();
    let mut pipeline = pipeline(registry, runner, "failing", Box::new(executor));

    let outcome = pipeline.handle(raw(&[("state", json!("2"))]));

    assert_eq!(
        outcome,
        EventOutcome::Dropped {
            reason: DropReason::DeciderFailed {
                error: "no contact group for host".into()
            }
        }
    );
    assert!(commands.lock().unwrap().is_empty());
}

#[test]
fn incomplete_event_drops_as_policy_bug() {
    let registry = registry_with("lazy", || Box::new(IncompleteDecider));
    let runner = shell_runner(&["command_template=true"]);
    let mut pipeline = pipeline(
        registry,
        runner,
        "lazy",
        Box::new(StaticExecutor::exiting(0)),
    );

    let outcome = pipeline.handle(raw(&[]));

    assert_eq!(
        outcome,
        EventOutcome::Dropped {
            reason: DropReason::Incomplete
        }
    );
    assert!(outcome.is_success());
}

#[test]
fn unknown_decider_fails_at_construction() {
    let err = Pipeline::new(
        Registry::with_builtins(),
        shell_runner(&["command_template=true"]),
        "notify",
        "no_such_policy",
        Box::new(StaticEnvironment::default()),
        Box::new(StaticExecutor::exiting(0)),
    )
    .err();

    assert_eq!(
        err,
        Some(RegistryError::DeciderNotFound("no_such_policy".into()))
    );
}

// ── execute paths ───────────────────────────────────────────────────

#[test]
fn nonzero_exit_is_a_failure_with_diagnostics() {
    let registry = registry_with("paging", || Box::new(PagingDecider));
    let runner = shell_runner(&["command_template=notify.sh {contact}", "contact=x"]);
    let executor = StaticExecutor::exiting(2).with_output("partial", "boom");
    let mut pipeline = pipeline(registry, runner, "paging", Box::new(executor));

    let outcome = pipeline.handle(raw(&[("state", json!("2"))]));

    match outcome {
        EventOutcome::Executed { success, report } => {
            assert!(!success);
            assert_eq!(report.exit_code, Some(2));
            assert_eq!(report.stdout, "partial");
            assert_eq!(report.stderr, "boom");
            assert_eq!(report.exception, None);
        }
        other => panic!("expected executed outcome, got {other:?}"),
    }
}

#[test]
fn spawn_failure_is_an_execution_exception() {
    let registry = registry_with("paging", || Box::new(PagingDecider));
    let runner = shell_runner(&["command_template=notify.sh {contact}", "contact=x"]);
    let mut pipeline = pipeline(registry, runner, "paging", Box::new(BrokenExecutor));

    let outcome = pipeline.handle(raw(&[("state", json!("2"))]));

    match outcome {
        EventOutcome::Executed { success, report } => {
            assert!(!success);
            assert_eq!(report.exit_code, None);
            let exception = report.exception.expect("exception text");
            assert!(exception.contains("failed to spawn"));
        }
        other => panic!("expected executed outcome, got {other:?}"),
    }
}

#[test]
fn empty_command_is_a_runner_defect() {
    let registry = registry_with("paging", || Box::new(PagingDecider));
    let runner = Box::new(EmptyCommandRunner {
        opts: RunnerOpts::new(),
    });
    let executor = StaticExecutor::exiting(0);
    let commands = executor.commands();
    let mut pipeline = pipeline(registry, runner, "paging", Box::new(executor));

    let outcome = pipeline.handle(raw(&[("state", json!("2"))]));

    match outcome {
        EventOutcome::Executed { success, report } => {
            assert!(!success);
            assert_eq!(report.command, None);
            assert_eq!(
                report.exception.as_deref(),
                Some("runner did not return a command")
            );
        }
        other => panic!("expected executed outcome, got {other:?}"),
    }
    assert!(commands.lock().unwrap().is_empty());
}

#[test]
fn command_build_error_is_an_execution_exception() {
    let registry = registry_with("paging", || Box::new(PagingDecider));
    // Template references a key neither the opts nor the event provide.
    let runner = shell_runner(&["command_template=notify.sh {missing_key}"]);
    let mut pipeline = pipeline(
        registry,
        runner,
        "paging",
        Box::new(StaticExecutor::exiting(0)),
    );

    let outcome = pipeline.handle(raw(&[("state", json!("2"))]));

    match outcome {
        EventOutcome::Executed { success, report } => {
            assert!(!success);
            let exception = report.exception.expect("exception text");
            assert!(exception.contains("missing_key"));
        }
        other => panic!("expected executed outcome, got {other:?}"),
    }
}

// ── environment injection ───────────────────────────────────────────

#[test]
fn decider_sees_environment_fields_and_runner_name() {
    let registry = registry_with("probe", || Box::new(EnvProbeDecider));
    let runner = shell_runner(&["command_template=true"]);
    let mut pipeline = pipeline(
        registry,
        runner,
        "probe",
        Box::new(StaticExecutor::exiting(0)),
    );

    let outcome = pipeline.handle(raw(&[]));

    match outcome {
        EventOutcome::Executed { report, .. } => {
            assert_eq!(
                report.summary,
                "\"testsite\" \"mon01\" \"mon01.example.org\" 1754000000 via notify"
            );
        }
        other => panic!("expected executed outcome, got {other:?}"),
    }
}
