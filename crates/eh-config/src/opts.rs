//! Runner option maps and `KEY=VALUE` pair parsing.
//!
//! A runner is constructed from an arbitrary named option map. Every key is
//! a candidate for later overlay by a decided event's payload: the overlay
//! only ever overwrites keys the runner already carries, it never introduces
//! new ones. Concrete runners extract a typed view of the keys they
//! recognize at command-build time, after the overlay has been applied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from option parsing.
#[derive(Debug, Error)]
pub enum OptsError {
    #[error("invalid option pair {0:?}, expected KEY=VALUE")]
    InvalidPair(String),

    #[error("empty option key in {0:?}")]
    EmptyKey(String),
}

impl From<OptsError> for eh_common::Error {
    fn from(err: OptsError) -> Self {
        match err {
            OptsError::InvalidPair(pair) | OptsError::EmptyKey(pair) => {
                eh_common::Error::InvalidOptionPair(pair)
            }
        }
    }
}

/// Parse repeated `KEY=VALUE` arguments into an ordered map.
///
/// Values are kept as strings; the event pipeline applies its own
/// digit-string normalization where that is part of the contract.
pub fn parse_pairs<I, S>(pairs: I) -> Result<Map<String, Value>, OptsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = Map::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| OptsError::InvalidPair(pair.to_string()))?;
        if key.is_empty() {
            return Err(OptsError::EmptyKey(pair.to_string()));
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(map)
}

/// The option map a runner is constructed with.
///
/// Keys are opaque to the pipeline; only the payload overlay rule is
/// enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunnerOpts(Map<String, Value>);

impl RunnerOpts {
    pub fn new() -> Self {
        RunnerOpts(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        RunnerOpts(map)
    }

    /// Build from repeated `KEY=VALUE` arguments.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, OptsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(RunnerOpts(parse_pairs(pairs)?))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String view of an option; numbers are rendered, other shapes are None.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Overlay a decided event's payload onto these options.
    ///
    /// For every key in `payload` that already exists here, the value is
    /// overwritten. Unknown keys are ignored, not added.
    pub fn overlay(&mut self, payload: &Map<String, Value>) {
        for (key, value) in payload {
            if let Some(slot) = self.0.get_mut(key) {
                *slot = value.clone();
            }
        }
    }
}
