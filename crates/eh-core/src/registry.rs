//! Registry: resolve runner and decider implementations by name.
//!
//! The pipeline never depends on concrete implementations; it looks them up
//! here by the names given on the command line. Capability conformance is
//! enforced by the trait system at compile time, so resolution can only
//! fail by name.

use std::collections::BTreeMap;

use thiserror::Error;

use eh_config::RunnerOpts;

use crate::decider::Decider;
use crate::deciders::AcceptAllDecider;
use crate::runner::Runner;
use crate::runners::ShellRunner;

/// Errors from registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0:?} is not part of our runner collection")]
    RunnerNotFound(String),

    #[error("found no decider {0:?}")]
    DeciderNotFound(String),

    #[error("duplicate runner {0:?}")]
    DuplicateRunner(String),

    #[error("duplicate decider {0:?}")]
    DuplicateDecider(String),
}

impl From<RegistryError> for eh_common::Error {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::RunnerNotFound(name) | RegistryError::DuplicateRunner(name) => {
                eh_common::Error::RunnerNotFound { name }
            }
            RegistryError::DeciderNotFound(name) | RegistryError::DuplicateDecider(name) => {
                eh_common::Error::DeciderNotFound { name }
            }
        }
    }
}

/// Constructs a runner from its option map.
pub type RunnerFactory = Box<dyn Fn(RunnerOpts) -> Box<dyn Runner> + Send + Sync>;

/// Constructs a fresh decider. Called once per event so policies cannot
/// carry state across events.
pub type DeciderFactory = Box<dyn Fn() -> Box<dyn Decider> + Send + Sync>;

/// Name-indexed runner and decider factories.
#[derive(Default)]
pub struct Registry {
    runners: BTreeMap<String, RunnerFactory>,
    deciders: BTreeMap<String, DeciderFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registry preloaded with the builtin implementations.
    pub fn with_builtins() -> Self {
        let mut registry = Registry::new();
        // Registration of builtins cannot collide in an empty registry.
        let _ = registry.register_runner("shell", |opts| Box::new(ShellRunner::new(opts)));
        let _ = registry.register_decider("accept_all", || Box::new(AcceptAllDecider));
        registry
    }

    pub fn register_runner<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(RunnerOpts) -> Box<dyn Runner> + Send + Sync + 'static,
    {
        if self.runners.contains_key(name) {
            return Err(RegistryError::DuplicateRunner(name.to_string()));
        }
        self.runners.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    pub fn register_decider<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn Decider> + Send + Sync + 'static,
    {
        if self.deciders.contains_key(name) {
            return Err(RegistryError::DuplicateDecider(name.to_string()));
        }
        self.deciders.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    pub fn resolve_runner(&self, name: &str) -> Result<&RunnerFactory, RegistryError> {
        self.runners
            .get(name)
            .ok_or_else(|| RegistryError::RunnerNotFound(name.to_string()))
    }

    pub fn resolve_decider(&self, name: &str) -> Result<&DeciderFactory, RegistryError> {
        self.deciders
            .get(name)
            .ok_or_else(|| RegistryError::DeciderNotFound(name.to_string()))
    }

    pub fn runner_names(&self) -> Vec<&str> {
        self.runners.keys().map(String::as_str).collect()
    }

    pub fn decider_names(&self) -> Vec<&str> {
        self.deciders.keys().map(String::as_str).collect()
    }
}
