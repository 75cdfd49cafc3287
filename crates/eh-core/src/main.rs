//! Eventhandler CLI: handle one monitoring event per invocation.

use std::io::Read;

use clap::Parser;
use serde::Serialize;

use eh_common::{Error, OutputFormat, SCHEMA_VERSION};
use eh_config::{parse_pairs, ConfigPaths, RunnerOpts};
use eh_core::environment::SystemEnvironment;
use eh_core::event::EventOpts;
use eh_core::exec::ShellExecutor;
use eh_core::exit_codes::ExitCode;
use eh_core::logging::{setup_logging, Verbosity};
use eh_core::pipeline::{EventOutcome, Pipeline};
use eh_core::registry::Registry;

/// Handle one monitoring event: decide, execute, report.
#[derive(Parser, Debug)]
#[command(name = "eventhandler", version, about)]
struct Cli {
    /// Runner implementation executing the decided action
    #[arg(long)]
    runner: String,

    /// Decider policy choosing whether and how to act
    #[arg(long)]
    decider: String,

    /// Tag appended to the runner name (log file suffix)
    #[arg(long)]
    tag: Option<String>,

    /// Runner option as KEY=VALUE (repeatable)
    #[arg(long = "runneropt", value_name = "KEY=VALUE")]
    runneropts: Vec<String>,

    /// Raw event attribute as KEY=VALUE (repeatable)
    #[arg(long = "eventopt", value_name = "KEY=VALUE")]
    eventopts: Vec<String>,

    /// Raw event as a JSON object, or "-" to read it from stdin
    #[arg(long, value_name = "JSON", conflicts_with = "eventopts")]
    event_json: Option<String>,

    /// Also log INFO lines to the console
    #[arg(short, long)]
    verbose: bool,

    /// Debug logging on console and in the log file
    #[arg(long)]
    debug: bool,

    /// Outcome report format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Serialize)]
struct OutcomeReport<'a> {
    schema_version: &'static str,
    #[serde(flatten)]
    outcome: &'a EventOutcome,
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            if err.code() < 30 {
                ExitCode::ConfigError
            } else {
                ExitCode::InternalError
            }
        }
    };
    std::process::exit(code.as_i32());
}

fn run(cli: Cli) -> Result<ExitCode, Error> {
    let paths = ConfigPaths::resolve();
    let composed_name = match &cli.tag {
        Some(tag) => format!("{}_{}", cli.runner, tag),
        None => cli.runner.clone(),
    };
    setup_logging(
        &paths,
        &composed_name,
        Verbosity::from_flags(cli.verbose, cli.debug),
    )
    .map_err(|err| Error::Config(err.to_string()))?;

    let registry = Registry::with_builtins();
    let opts = RunnerOpts::from_pairs(&cli.runneropts)?;
    let runner = registry.resolve_runner(&cli.runner)?(opts);
    let raw_event = read_event(&cli)?;

    let mut pipeline = Pipeline::new(
        registry,
        runner,
        cli.runner.clone(),
        cli.decider.clone(),
        Box::new(SystemEnvironment),
        Box::new(ShellExecutor),
    )?;
    let outcome = pipeline.handle(raw_event);

    print_outcome(&outcome, cli.output)?;
    Ok(ExitCode::from_outcome(&outcome))
}

fn read_event(cli: &Cli) -> Result<EventOpts, Error> {
    if let Some(arg) = &cli.event_json {
        let text = if arg == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            arg.clone()
        };
        match serde_json::from_str(&text)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(Error::InvalidEvent("event JSON must be an object".into())),
        }
    } else {
        Ok(parse_pairs(&cli.eventopts)?)
    }
}

fn print_outcome(outcome: &EventOutcome, format: OutputFormat) -> Result<(), Error> {
    match format {
        OutputFormat::Text => match outcome {
            EventOutcome::Discarded { silent: true, .. } => println!("discarded (silent)"),
            EventOutcome::Discarded { summary, .. } => {
                println!("discarded: {}", summary.as_deref().unwrap_or(""))
            }
            EventOutcome::Dropped { reason } => println!("dropped: {reason}"),
            EventOutcome::Executed {
                success: true,
                report,
            } => println!("success: {}", report.summary),
            EventOutcome::Executed {
                success: false,
                report,
            } => println!("failed: {}", report.summary),
        },
        OutputFormat::Json => {
            let report = OutcomeReport {
                schema_version: SCHEMA_VERSION,
                outcome,
            };
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}
