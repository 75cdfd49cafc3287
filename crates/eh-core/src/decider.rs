//! Decider contract: the pluggable policy that decides whether to act.
//!
//! A decider inspects the normalized event attributes and either prepares
//! the event for execution (payload + summary) or discards it. One fresh
//! instance is created per event, so implementations cannot leak state
//! between events. Implementations must not leave a non-discarded event
//! incomplete; the pipeline treats that as a policy bug.

use thiserror::Error;

use crate::event::DecidedEvent;

/// Errors raised by a decider policy.
///
/// The pipeline catches these at the handle boundary, logs one critical
/// line, and drops the event.
#[derive(Debug, Error)]
pub enum DeciderError {
    #[error("{0}")]
    Policy(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Context a decider may consult in addition to the event itself.
#[derive(Debug, Clone)]
pub struct DeciderContext {
    /// The runner's logical name, tag stripped, so policies can be
    /// tag-aware without parsing composed names.
    pub runner: String,
}

/// A pluggable event policy.
pub trait Decider {
    /// Inspect `event.eventopts()` and either prepare the event for
    /// execution (set payload and summary) or discard it.
    fn decide_and_prepare(
        &self,
        ctx: &DeciderContext,
        event: &mut DecidedEvent,
    ) -> Result<(), DeciderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventOpts;
    use serde_json::json;

    struct StateGate;

    impl Decider for StateGate {
        fn decide_and_prepare(
            &self,
            ctx: &DeciderContext,
            event: &mut DecidedEvent,
        ) -> Result<(), DeciderError> {
            if event.eventopts().get("state") == Some(&json!(0)) {
                event.discard(true);
                return Ok(());
            }
            event.set_payload(EventOpts::new());
            event.set_summary(format!("handled by {}", ctx.runner));
            Ok(())
        }
    }

    #[test]
    fn decider_sees_normalized_attributes() {
        let mut raw = EventOpts::new();
        raw.insert("state".into(), json!("0"));
        let mut event = DecidedEvent::new(raw);
        let ctx = DeciderContext {
            runner: "sms".into(),
        };
        StateGate.decide_and_prepare(&ctx, &mut event).unwrap();
        assert!(event.is_discarded());
    }

    #[test]
    fn decider_reads_the_runner_name() {
        let mut raw = EventOpts::new();
        raw.insert("state".into(), json!("2"));
        let mut event = DecidedEvent::new(raw);
        let ctx = DeciderContext {
            runner: "sms".into(),
        };
        StateGate.decide_and_prepare(&ctx, &mut event).unwrap();
        assert!(event.is_complete());
        assert_eq!(event.summary(), Some("handled by sms"));
    }

    #[test]
    fn decider_error_renders_its_message() {
        let err = DeciderError::Policy("no contact for host".into());
        assert_eq!(err.to_string(), "no contact for host");
    }
}
