//! Logging bootstrap for one process invocation.
//!
//! One log file per composed runner name (`eventhandler_<name>.log`) in
//! the resolved log directory, console output on stderr. Console level is
//! off/INFO/DEBUG for quiet/verbose/debug, file level INFO or DEBUG;
//! `RUST_LOG` overrides the console filter when set.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use eh_config::ConfigPaths;

/// Console verbosity selected by the CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    fn console_level(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::OFF,
            Verbosity::Verbose => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
        }
    }

    fn file_level(self) -> LevelFilter {
        match self {
            Verbosity::Debug => LevelFilter::DEBUG,
            _ => LevelFilter::INFO,
        }
    }
}

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("global subscriber already installed")]
    AlreadyInitialized,
}

/// Install the global subscriber for this process. Call once.
pub fn setup_logging(
    paths: &ConfigPaths,
    runner_name: &str,
    verbosity: Verbosity,
) -> Result<(), LoggingError> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(verbosity.console_level().into()));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = match paths.log_file(runner_name) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| LoggingError::OpenLogFile {
                    path: path.clone(),
                    source,
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| LoggingError::OpenLogFile {
                    path: path.clone(),
                    source,
                })?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(verbosity.file_level());
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_wins_over_verbose() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Quiet);
    }

    #[test]
    fn quiet_console_is_off_but_file_stays_info() {
        assert_eq!(Verbosity::Quiet.console_level(), LevelFilter::OFF);
        assert_eq!(Verbosity::Quiet.file_level(), LevelFilter::INFO);
        assert_eq!(Verbosity::Debug.file_level(), LevelFilter::DEBUG);
    }

    #[test]
    fn setup_creates_the_log_file_and_is_once_only() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::from_omd_root(Some(dir.path().to_path_buf()));
        setup_logging(&paths, "sms_ops", Verbosity::Quiet).unwrap();
        assert!(dir.path().join("var/log/eventhandler_sms_ops.log").exists());

        let again = setup_logging(&paths, "sms_ops", Verbosity::Quiet);
        assert!(matches!(again, Err(LoggingError::AlreadyInitialized)));
    }
}
