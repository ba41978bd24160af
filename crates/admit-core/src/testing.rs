//! In-memory host for exercising policies without a wasm runtime.
//!
//! ```
//! use admit_core::testing::FakeHost;
//! use admit_core::{Host, PolicyResult, output_result, run};
//!
//! let fake = FakeHost::new().with_material(br#"{"name":"app"}"#.to_vec());
//! let code = run(&Host::new(&fake), |host| {
//!     output_result(host, &PolicyResult::success())?;
//!     Ok(())
//! });
//!
//! assert_eq!(code.as_i32(), 0);
//! assert_eq!(fake.last_output_json().unwrap()["skipped"], false);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::HostError;
use crate::host::{
    ARGS_CONFIG_KEY, ConfigPort, DiscoverPort, HttpPort, HttpRequest, HttpResponse, InputPort,
    LogLevel, LogPort, MemoryPort, OutputPort,
};

/// Scripted host that records everything a policy does.
///
/// HTTP calls to unregistered `(method, url)` pairs fail; discovery of an
/// unregistered `(digest, kind)` pair returns handle `0`.
#[derive(Debug, Default)]
pub struct FakeHost {
    material: Option<Vec<u8>>,
    config: BTreeMap<String, String>,
    http: BTreeMap<(String, String), Result<HttpResponse, String>>,
    discover: BTreeMap<(String, String), u64>,
    blocks: BTreeMap<u64, Vec<u8>>,
    next_handle: u64,
    requests: RefCell<Vec<HttpRequest>>,
    discover_calls: RefCell<Vec<(String, String)>>,
    outputs: RefCell<Vec<Vec<u8>>>,
    logs: RefCell<Vec<(LogLevel, String)>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(mut self, material: impl Into<Vec<u8>>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Sets the raw JSON argument string.
    pub fn with_args(self, args: impl Into<String>) -> Self {
        self.with_config(ARGS_CONFIG_KEY, args)
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_http_response(
        mut self,
        method: &str,
        url: &str,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.http.insert(
            (method.to_string(), url.to_string()),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        );
        self
    }

    pub fn with_http_failure(mut self, method: &str, url: &str, message: impl Into<String>) -> Self {
        self.http
            .insert((method.to_string(), url.to_string()), Err(message.into()));
        self
    }

    /// Registers a discovery payload, stored in a fresh memory block.
    pub fn with_discovery(mut self, digest: &str, kind: &str, payload: impl Into<Vec<u8>>) -> Self {
        self.next_handle += 1;
        let handle = self.next_handle;
        self.blocks.insert(handle, payload.into());
        self.discover
            .insert((digest.to_string(), kind.to_string()), handle);
        self
    }

    /// Registers a raw handle with no backing block.
    pub fn with_discover_handle(mut self, digest: &str, kind: &str, handle: u64) -> Self {
        self.discover
            .insert((digest.to_string(), kind.to_string()), handle);
        self
    }

    pub fn outputs(&self) -> Vec<Vec<u8>> {
        self.outputs.borrow().clone()
    }

    pub fn last_output_json(&self) -> Option<serde_json::Value> {
        self.outputs
            .borrow()
            .last()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }

    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.logs.borrow().clone()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn discover_calls(&self) -> Vec<(String, String)> {
        self.discover_calls.borrow().clone()
    }
}

impl InputPort for FakeHost {
    fn input(&self) -> Result<Vec<u8>, HostError> {
        self.material
            .clone()
            .ok_or_else(|| HostError::new("no material configured"))
    }
}

impl ConfigPort for FakeHost {
    fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).cloned()
    }
}

impl OutputPort for FakeHost {
    fn emit(&self, bytes: &[u8]) {
        self.outputs.borrow_mut().push(bytes.to_vec());
    }
}

impl HttpPort for FakeHost {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HostError> {
        self.requests.borrow_mut().push(request.clone());
        match self
            .http
            .get(&(request.method.clone(), request.url.clone()))
        {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(HostError::new(message.clone())),
            None => Err(HostError::new(format!(
                "host is not allowed to make HTTP requests to {}",
                request.url
            ))),
        }
    }
}

impl DiscoverPort for FakeHost {
    fn discover(&self, digest: &str, kind: &str) -> u64 {
        self.discover_calls
            .borrow_mut()
            .push((digest.to_string(), kind.to_string()));
        self.discover
            .get(&(digest.to_string(), kind.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl MemoryPort for FakeHost {
    fn read(&self, handle: u64) -> Option<Vec<u8>> {
        self.blocks.get(&handle).cloned()
    }
}

impl LogPort for FakeHost {
    fn log(&self, level: LogLevel, message: &str) {
        self.logs.borrow_mut().push((level, message.to_string()));
    }
}
