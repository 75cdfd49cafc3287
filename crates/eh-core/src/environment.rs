//! Host environment lookup and raw-event injection.
//!
//! Before an event reaches the decider, four environment-derived fields are
//! stamped onto the raw map so every policy can rely on them: the OMD site
//! name, the originating host name and FQDN, and a Unix timestamp.

use serde_json::{Number, Value};

use crate::event::EventOpts;

/// Raw-event keys populated from the environment.
pub const SITE_KEY: &str = "omd_site";
pub const ORIGINATING_HOST_KEY: &str = "omd_originating_host";
pub const ORIGINATING_FQDN_KEY: &str = "omd_originating_fqdn";
pub const ORIGINATING_TIMESTAMP_KEY: &str = "omd_originating_timestamp";

/// Site value used when the environment defines none.
pub const DEFAULT_SITE: &str = "get https://omd.consol.de/docs/omd";

/// Supplies the environment-derived fields of a raw event.
pub trait EnvironmentProvider {
    /// Site identifier, `None` outside an OMD site.
    fn site(&self) -> Option<String>;

    fn hostname(&self) -> String;

    fn fqdn(&self) -> String;

    /// Current Unix timestamp in seconds.
    fn timestamp(&self) -> i64;
}

/// Real environment: `$OMD_SITE`, gethostname, wall clock.
#[derive(Debug, Default)]
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn site(&self) -> Option<String> {
        std::env::var("OMD_SITE").ok()
    }

    fn hostname(&self) -> String {
        hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "localhost".to_string())
    }

    fn fqdn(&self) -> String {
        // gethostname() is configured fully qualified on OMD hosts.
        self.hostname()
    }

    fn timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed environment (used for tests and scaffolding).
#[derive(Debug, Clone)]
pub struct StaticEnvironment {
    pub site: Option<String>,
    pub hostname: String,
    pub fqdn: String,
    pub timestamp: i64,
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        StaticEnvironment {
            site: Some("testsite".to_string()),
            hostname: "mon01".to_string(),
            fqdn: "mon01.example.org".to_string(),
            timestamp: 1_754_000_000,
        }
    }
}

impl EnvironmentProvider for StaticEnvironment {
    fn site(&self) -> Option<String> {
        self.site.clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn fqdn(&self) -> String {
        self.fqdn.clone()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Stamp the environment-derived fields onto a raw event.
///
/// An `omd_site` supplied by the caller wins; the other three fields are
/// always overwritten with fresh values.
pub fn inject_environment(raw: &mut EventOpts, env: &dyn EnvironmentProvider) {
    if !raw.contains_key(SITE_KEY) {
        let site = env.site().unwrap_or_else(|| DEFAULT_SITE.to_string());
        raw.insert(SITE_KEY.to_string(), Value::String(site));
    }
    raw.insert(
        ORIGINATING_HOST_KEY.to_string(),
        Value::String(env.hostname()),
    );
    raw.insert(ORIGINATING_FQDN_KEY.to_string(), Value::String(env.fqdn()));
    raw.insert(
        ORIGINATING_TIMESTAMP_KEY.to_string(),
        Value::Number(Number::from(env.timestamp())),
    );
}
