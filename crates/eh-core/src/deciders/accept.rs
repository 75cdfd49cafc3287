//! Builtin `accept_all` decider: act on every event except heartbeats.
//!
//! Heartbeat events (a truthy `heartbeat` attribute) are marked and
//! discarded silently. Everything else gets an empty payload and a concise
//! summary assembled from the common monitoring attributes when they are
//! present; otherwise the default stringified-event summary stands.

use serde_json::Value;

use crate::decider::{Decider, DeciderContext, DeciderError};
use crate::event::{DecidedEvent, EventOpts};

pub struct AcceptAllDecider;

impl Decider for AcceptAllDecider {
    fn decide_and_prepare(
        &self,
        _ctx: &DeciderContext,
        event: &mut DecidedEvent,
    ) -> Result<(), DeciderError> {
        if is_truthy(event.eventopts().get("heartbeat")) {
            event.set_is_heartbeat(true);
            event.discard(true);
            return Ok(());
        }

        if let Some(summary) = concise_summary(event.eventopts()) {
            event.set_summary(summary);
        }
        event.set_payload(EventOpts::new());
        Ok(())
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() != Some(0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        _ => false,
    }
}

/// `host service: output (state N)` from whichever attributes exist.
fn concise_summary(eventopts: &EventOpts) -> Option<String> {
    let mut parts = Vec::new();
    for key in ["host_name", "service_description"] {
        if let Some(Value::String(s)) = eventopts.get(key) {
            parts.push(s.clone());
        }
    }
    if let Some(Value::String(s)) = eventopts.get("output") {
        parts.push(s.clone());
    }
    if parts.is_empty() {
        return None;
    }
    let mut summary = parts.join(" ");
    if let Some(Value::Number(state)) = eventopts.get("state") {
        summary.push_str(&format!(" (state {state})"));
    }
    Some(summary)
}
