//! Builtin `shell` runner: renders a command template against the event.
//!
//! The runner is configured with a `command_template` option containing
//! `{key}` placeholders. At build time each placeholder is resolved from
//! the (payload-overlaid) runner options first, then from the event's
//! normalized attributes. `{{` and `}}` produce literal braces.

use serde_json::Value;

use eh_config::RunnerOpts;

use crate::event::DecidedEvent;
use crate::runner::{Runner, RunnerError};

/// Typed view of the options the shell runner recognizes, extracted after
/// the payload overlay has been applied.
struct ShellConfig {
    command_template: String,
}

impl ShellConfig {
    fn from_opts(opts: &RunnerOpts) -> Result<Self, RunnerError> {
        let command_template = opts
            .get_str("command_template")
            .ok_or(RunnerError::MissingOption("command_template"))?;
        Ok(ShellConfig { command_template })
    }
}

/// Runner that shells out through a configured command template.
pub struct ShellRunner {
    opts: RunnerOpts,
}

impl ShellRunner {
    pub fn new(opts: RunnerOpts) -> Self {
        ShellRunner { opts }
    }
}

impl Runner for ShellRunner {
    fn opts(&self) -> &RunnerOpts {
        &self.opts
    }

    fn opts_mut(&mut self) -> &mut RunnerOpts {
        &mut self.opts
    }

    fn build_command(&mut self, event: &DecidedEvent) -> Result<String, RunnerError> {
        let config = ShellConfig::from_opts(&self.opts)?;
        render_template(&config.command_template, |key| {
            self.opts
                .get_str(key)
                .or_else(|| event.eventopts().get(key).and_then(value_as_string))
        })
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Substitute `{key}` placeholders; a key the lookup cannot resolve is a
/// build error, not an empty substitution.
fn render_template<F>(template: &str, lookup: F) -> Result<String, RunnerError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => key.push(ch),
                        None => return Err(RunnerError::UnterminatedPlaceholder),
                    }
                }
                let value =
                    lookup(&key).ok_or_else(|| RunnerError::UnknownTemplateKey(key.clone()))?;
                out.push_str(&value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}
