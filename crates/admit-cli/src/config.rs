//! Harness configuration (`admit.toml`).
//!
//! ```toml
//! [http]
//! allowed_hosts = ["api.example.com", "*.internal.example.com"]
//! timeout_secs = 10
//!
//! [discover]
//! index = "discover-index.json"
//! ```
//!
//! Relative paths resolve against the config file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub discover: DiscoverConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Hostnames policies may reach. Empty denies all HTTP.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    /// Per-request timeout. Must be at least 1.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// Exact match, or `*.suffix` matching any subdomain of `suffix`.
    pub fn allows(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            match pattern.strip_prefix("*.") {
                Some(suffix) => host
                    .strip_suffix(suffix)
                    .is_some_and(|rest| rest.ends_with('.') && rest.len() > 1),
                None => host == pattern,
            }
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverConfig {
    /// JSON index answering discovery calls. Absent means no backend.
    pub index: Option<PathBuf>,
}

impl HarnessConfig {
    /// Loads `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config: {}", path.display()))?;
        if config.http.timeout_secs == 0 {
            bail!(
                "invalid config: {}: http.timeout_secs must be at least 1",
                path.display()
            );
        }

        if let (Some(index), Some(dir)) = (&config.discover.index, path.parent())
            && index.is_relative()
        {
            config.discover.index = Some(dir.join(index));
        }

        log::debug!(
            "loaded config from {} ({} allowed host(s))",
            path.display(),
            config.http.allowed_hosts.len()
        );
        Ok(config)
    }
}
