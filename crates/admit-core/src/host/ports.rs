//! Capability ports a policy consumes from its host.
//!
//! Each trait stands for one host primitive. The production implementation
//! lives in `guest` (wasm32 imports); tests and the local harness substitute
//! their own.

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Config key under which the host stores the JSON-encoded policy arguments.
pub const ARGS_CONFIG_KEY: &str = "args";

/// Read-only access to the material under evaluation.
pub trait InputPort {
    /// Returns the raw material bytes. Called on every access; never cached.
    fn input(&self) -> Result<Vec<u8>, HostError>;
}

/// Read-only host configuration values.
pub trait ConfigPort {
    fn get(&self, key: &str) -> Option<String>;
}

/// The single channel a verdict travels back to the host on.
pub trait OutputPort {
    fn emit(&self, bytes: &[u8]);
}

/// Outbound HTTP. Hostname allow-listing is the host's business and
/// surfaces here only as an `Err`.
pub trait HttpPort {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HostError>;
}

/// Artifact discovery. Returns a memory handle, `0` meaning the call failed.
pub trait DiscoverPort {
    fn discover(&self, digest: &str, kind: &str) -> u64;
}

/// Dereferences host memory handles.
pub trait MemoryPort {
    fn read(&self, handle: u64) -> Option<Vec<u8>>;
}

/// Fire-and-forget log sink.
pub trait LogPort {
    fn log(&self, level: LogLevel, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Wire code used by the raw host import.
    pub fn code(self) -> u32 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warn => 2,
            LogLevel::Error => 3,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request handed to the host HTTP primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".into(),
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: "POST".into(),
            url: url.into(),
            body: Some(body.into()),
        }
    }
}

/// Response returned by the host HTTP primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default)]
    pub body: String,
}

/// Stand-in for ports a host does not wire up.
///
/// Every call fails or comes back empty so a policy that reaches for a
/// missing capability errors out instead of seeing fabricated data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPorts;

impl InputPort for NullPorts {
    fn input(&self) -> Result<Vec<u8>, HostError> {
        Err(HostError::new("host provides no material"))
    }
}

impl ConfigPort for NullPorts {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

impl HttpPort for NullPorts {
    fn request(&self, _request: &HttpRequest) -> Result<HttpResponse, HostError> {
        Err(HostError::new("HTTP is not available on this host"))
    }
}

impl DiscoverPort for NullPorts {
    fn discover(&self, _digest: &str, _kind: &str) -> u64 {
        0
    }
}

impl MemoryPort for NullPorts {
    fn read(&self, _handle: u64) -> Option<Vec<u8>> {
        None
    }
}

impl LogPort for NullPorts {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_codes_round_trip() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(LogLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(LogLevel::from_code(9), None);
    }

    #[test]
    fn trace_maps_to_debug() {
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Debug);
    }

    #[test]
    fn http_request_omits_absent_body() {
        let json = serde_json::to_value(HttpRequest::get("https://example.com")).unwrap();
        assert_eq!(json["method"], "GET");
        assert!(json.get("body").is_none());

        let json = serde_json::to_value(HttpRequest::post("https://example.com", "{}")).unwrap();
        assert_eq!(json["body"], "{}");
    }

    #[test]
    fn null_ports_never_fabricate_data() {
        assert!(NullPorts.input().is_err());
        assert_eq!(ConfigPort::get(&NullPorts, "args"), None);
        assert_eq!(NullPorts.discover("sha256:abc", ""), 0);
        assert_eq!(NullPorts.read(1), None);
        assert!(NullPorts.request(&HttpRequest::get("https://x")).is_err());
    }
}
