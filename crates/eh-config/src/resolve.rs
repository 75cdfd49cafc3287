//! Path resolution for the eventhandler process.
//!
//! Resolution order follows env → XDG fallback: an OMD site install sets
//! `OMD_ROOT` and gets its logs under `$OMD_ROOT/var/log`; outside a site
//! the XDG state directory is used instead, and if even that is missing the
//! process runs with console logging only.

use std::env;
use std::path::PathBuf;

/// Resolved filesystem locations for one process invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPaths {
    /// `$OMD_ROOT`, when the process runs inside an OMD site.
    pub omd_root: Option<PathBuf>,
    /// Directory for per-runner log files; `None` means console-only.
    pub log_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Resolve paths from the process environment.
    pub fn resolve() -> Self {
        Self::from_omd_root(env::var_os("OMD_ROOT").map(PathBuf::from))
    }

    /// Resolution against an explicit root (separated out for tests).
    pub fn from_omd_root(omd_root: Option<PathBuf>) -> Self {
        let log_dir = match &omd_root {
            Some(root) => Some(root.join("var/log")),
            None => dirs::state_dir().map(|d| d.join("eventhandler")),
        };
        ConfigPaths { omd_root, log_dir }
    }

    /// Log file path for a composed runner name, when file logging is on.
    pub fn log_file(&self, runner_name: &str) -> Option<PathBuf> {
        self.log_dir
            .as_ref()
            .map(|dir| dir.join(format!("eventhandler_{runner_name}.log")))
    }
}
