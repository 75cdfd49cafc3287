//! The value object carrying an event through its lifecycle.
//!
//! A raw monitoring event arrives as an ordered mapping of attribute names
//! to string or integer values. Construction normalizes it (pure-digit
//! strings become integers), after which the map is read-only. The decider
//! is the only party that mutates the event, by setting a payload and
//! summary or by discarding it; the pipeline then treats it as read-only.

use serde_json::{Map, Number, Value};

/// Ordered attribute map of a monitoring event.
pub type EventOpts = Map<String, Value>;

/// An event between reception and its terminal state.
#[derive(Debug, Clone)]
pub struct DecidedEvent {
    eventopts: EventOpts,
    payload: Option<EventOpts>,
    summary: Option<String>,
    runneropts: EventOpts,
    discarded: bool,
    discarded_silently: bool,
    is_heartbeat: Option<bool>,
}

impl DecidedEvent {
    /// Build from a raw event, normalizing pure-digit string values.
    pub fn new(raw: EventOpts) -> Self {
        let eventopts = normalize(raw);
        let summary = Value::Object(eventopts.clone()).to_string();
        DecidedEvent {
            eventopts,
            payload: None,
            summary: Some(summary),
            runneropts: EventOpts::new(),
            discarded: false,
            discarded_silently: true,
            is_heartbeat: None,
        }
    }

    pub fn eventopts(&self) -> &EventOpts {
        &self.eventopts
    }

    /// Attributes the runner overlays onto its own configuration.
    pub fn payload(&self) -> Option<&EventOpts> {
        self.payload.as_ref()
    }

    pub fn set_payload(&mut self, payload: EventOpts) {
        self.payload = Some(payload);
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    /// Decider-assigned runner options, default empty.
    pub fn runneropts(&self) -> &EventOpts {
        &self.runneropts
    }

    pub fn set_runneropts(&mut self, runneropts: EventOpts) {
        self.runneropts = runneropts;
    }

    pub fn is_heartbeat(&self) -> Option<bool> {
        self.is_heartbeat
    }

    pub fn set_is_heartbeat(&mut self, value: bool) {
        self.is_heartbeat = Some(value);
    }

    /// Completeness gate checked before execution: payload and summary set.
    pub fn is_complete(&self) -> bool {
        self.payload.is_some() && self.summary.is_some()
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    pub fn is_discarded_silently(&self) -> bool {
        self.discarded_silently
    }

    /// Discard the event. One-way; there is no un-discard.
    ///
    /// `discard(false)` means "take no action, but still log the summary".
    pub fn discard(&mut self, silently: bool) {
        self.discarded = true;
        self.discarded_silently = silently;
    }
}

/// Coerce pure-digit string values to integers; leave everything else alone.
///
/// Digit runs wider than i64 stay strings.
fn normalize(raw: EventOpts) -> EventOpts {
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) if is_digits(&s) => match s.parse::<i64>() {
                    Ok(n) => Value::Number(Number::from(n)),
                    Err(_) => Value::String(s),
                },
                other => other,
            };
            (key, value)
        })
        .collect()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
