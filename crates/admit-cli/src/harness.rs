//! Native implementations of the host ports.
//!
//! The harness plays the host for one policy invocation: it serves the
//! material from disk, hands over the CLI arguments, captures what the
//! policy emits, proxies allow-listed HTTP and answers discovery from a
//! JSON index.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use admit_core::host::{
    ARGS_CONFIG_KEY, ConfigPort, DiscoverPort, HttpPort, HttpRequest, HttpResponse, InputPort,
    LogLevel, LogPort, MemoryPort, OutputPort,
};
use admit_core::{DiscoverReference, DiscoverResult, HostError};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::{HarnessConfig, HttpConfig};

/// Log target for messages a policy sends through its log port.
pub const POLICY_LOG_TARGET: &str = "policy";

/// One digest's entry in the discovery index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexEntry {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub references: Vec<DiscoverReference>,
}

/// Discovery index file: digest to entry.
pub type DiscoverIndex = BTreeMap<String, IndexEntry>;

pub fn load_index(path: &Path) -> Result<DiscoverIndex> {
    let content = fs::read(path)
        .with_context(|| format!("failed to read discovery index: {}", path.display()))?;
    let index: DiscoverIndex = serde_json::from_slice(&content)
        .with_context(|| format!("invalid discovery index: {}", path.display()))?;
    log::debug!("loaded {} discovery entries from {}", index.len(), path.display());
    Ok(index)
}

/// Most redirect hops followed for one request.
const MAX_REDIRECTS: usize = 10;

/// Follows redirects only while every hop stays on an allowed host.
fn redirect_policy(http: HttpConfig) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        let host = attempt.url().host_str().unwrap_or_default().to_string();
        if !http.allows(&host) {
            log::warn!("blocked redirect to {host}: not in allowed_hosts");
            attempt.error(format!("redirect to host `{host}` is not in the HTTP allow-list"))
        } else if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

pub struct Harness {
    material: PathBuf,
    args: Option<String>,
    http: HttpConfig,
    client: reqwest::blocking::Client,
    index: Option<DiscoverIndex>,
    outputs: RefCell<Vec<Vec<u8>>>,
    blocks: RefCell<BTreeMap<u64, Vec<u8>>>,
    next_handle: Cell<u64>,
}

impl Harness {
    pub fn new(material: PathBuf, args: Option<String>, config: HarnessConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .redirect(redirect_policy(config.http.clone()))
            .build()
            .context("failed to build HTTP client")?;

        let index = config.discover.index.as_deref().map(load_index).transpose()?;

        Ok(Self {
            material,
            args,
            http: config.http,
            client,
            index,
            outputs: RefCell::new(Vec::new()),
            blocks: RefCell::new(BTreeMap::new()),
            next_handle: Cell::new(1),
        })
    }

    /// Everything the policy emitted, in order.
    pub fn outputs(&self) -> Vec<Vec<u8>> {
        self.outputs.borrow().clone()
    }

    fn alloc(&self, bytes: Vec<u8>) -> u64 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.blocks.borrow_mut().insert(handle, bytes);
        handle
    }

    fn lookup(&self, index: &DiscoverIndex, digest: &str, kind: &str) -> DiscoverResult {
        let entry = index.get(digest).cloned().unwrap_or_default();
        let references = entry
            .references
            .into_iter()
            .filter(|r| kind.is_empty() || r.kind == kind)
            .collect();
        DiscoverResult {
            digest: digest.to_string(),
            kind: entry.kind,
            references,
        }
    }
}

impl InputPort for Harness {
    fn input(&self) -> Result<Vec<u8>, HostError> {
        fs::read(&self.material).map_err(|e| {
            HostError::new(format!(
                "cannot read material {}: {e}",
                self.material.display()
            ))
        })
    }
}

impl ConfigPort for Harness {
    fn get(&self, key: &str) -> Option<String> {
        (key == ARGS_CONFIG_KEY).then(|| self.args.clone()).flatten()
    }
}

impl OutputPort for Harness {
    fn emit(&self, bytes: &[u8]) {
        self.outputs.borrow_mut().push(bytes.to_vec());
    }
}

impl HttpPort for Harness {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HostError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| HostError::new(format!("invalid URL {}: {e}", request.url)))?;
        let host = url.host_str().unwrap_or_default();
        if !self.http.allows(host) {
            log::warn!("blocked HTTP request to {host}: not in allowed_hosts");
            return Err(HostError::new(format!(
                "host `{host}` is not in the HTTP allow-list"
            )));
        }

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| HostError::new(format!("invalid HTTP method {}", request.method)))?;

        log::debug!("{method} {url}");
        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .map_err(|e| {
                HostError::new(format!(
                    "request to {} failed: {:#}",
                    request.url,
                    anyhow::Error::new(e)
                ))
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            HostError::new(format!("failed to read response from {}: {e}", request.url))
        })?;

        Ok(HttpResponse { status, body })
    }
}

impl DiscoverPort for Harness {
    fn discover(&self, digest: &str, kind: &str) -> u64 {
        let Some(index) = &self.index else {
            log::warn!("discovery requested for {digest} but no index is configured");
            return 0;
        };

        let result = self.lookup(index, digest, kind);
        log::debug!(
            "discovered {} reference(s) for {digest}",
            result.references.len()
        );
        match serde_json::to_vec(&result) {
            Ok(bytes) => self.alloc(bytes),
            Err(e) => {
                log::error!("failed to encode discovery result for {digest}: {e}");
                0
            }
        }
    }
}

impl MemoryPort for Harness {
    /// Hands the block over and frees it; a handle reads once.
    fn read(&self, handle: u64) -> Option<Vec<u8>> {
        self.blocks.borrow_mut().remove(&handle)
    }
}

impl LogPort for Harness {
    fn log(&self, level: LogLevel, message: &str) {
        log::log!(target: POLICY_LOG_TARGET, log::Level::from(level), "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admit_core::{Host, SdkError, discover, http_get, material_string};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn material(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn index() -> DiscoverIndex {
        serde_json::from_str(
            r#"{
                "sha256:aa": {
                    "kind": "CONTAINER_IMAGE",
                    "references": [
                        {"digest": "sha256:bb", "kind": "ATTESTATION"},
                        {"digest": "sha256:cc", "kind": "SBOM_CYCLONEDX_JSON"}
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    fn harness(file: &NamedTempFile, args: Option<&str>, index: Option<DiscoverIndex>) -> Harness {
        let mut harness = Harness::new(
            file.path().to_path_buf(),
            args.map(str::to_string),
            HarnessConfig::default(),
        )
        .unwrap();
        harness.index = index;
        harness
    }

    #[test]
    fn material_is_read_from_disk() {
        let file = material("hello");
        let h = harness(&file, None, None);

        assert_eq!(material_string(&Host::new(&h)).unwrap(), "hello");
    }

    #[test]
    fn missing_material_is_a_host_error() {
        let file = material("");
        let mut h = harness(&file, None, None);
        h.material = PathBuf::from("/nonexistent/material.json");

        let err = h.input().unwrap_err();
        assert!(err.message.contains("cannot read material"));
    }

    #[test]
    fn only_the_args_key_is_configured() {
        let file = material("");
        let h = harness(&file, Some(r#"{"a":1}"#), None);

        assert_eq!(h.get(ARGS_CONFIG_KEY).as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(h.get("other"), None);
    }

    #[test]
    fn http_outside_allow_list_never_leaves_the_process() {
        let file = material("");
        let h = harness(&file, None, None);

        let err = http_get(&Host::new(&h), "https://example.com/x").unwrap_err();
        assert!(err.to_string().contains("allow-list"));
    }

    #[test]
    fn discovery_without_index_returns_zero_handle() {
        let file = material("");
        let h = harness(&file, None, None);

        assert_eq!(h.discover("sha256:aa", ""), 0);
        let err = discover(&Host::new(&h), "sha256:aa", "").unwrap_err();
        assert!(matches!(err, SdkError::DiscoverUnavailable { .. }));
    }

    #[test]
    fn discovery_filters_by_kind() {
        let file = material("");
        let h = harness(&file, None, Some(index()));
        let host = Host::new(&h);

        let all = discover(&host, "sha256:aa", "").unwrap();
        assert_eq!(all.kind, "CONTAINER_IMAGE");
        assert_eq!(all.references.len(), 2);

        let attestations = discover(&host, "sha256:aa", "ATTESTATION").unwrap();
        assert_eq!(attestations.references.len(), 1);
        assert_eq!(attestations.references[0].digest, "sha256:bb");
    }

    #[test]
    fn unknown_digest_has_no_references() {
        let file = material("");
        let h = harness(&file, None, Some(index()));

        let result = discover(&Host::new(&h), "sha256:ff", "").unwrap();
        assert_eq!(result.digest, "sha256:ff");
        assert!(result.references.is_empty());
    }

    #[test]
    fn handles_are_distinct() {
        let file = material("");
        let h = harness(&file, None, Some(index()));

        let a = h.discover("sha256:aa", "");
        let b = h.discover("sha256:aa", "");
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert!(h.read(a).is_some());
        assert!(h.read(999).is_none());
    }

    #[test]
    fn blocks_are_freed_once_read() {
        let file = material("");
        let h = harness(&file, None, Some(index()));

        let handle = h.discover("sha256:aa", "");
        assert!(h.read(handle).is_some());
        assert!(h.read(handle).is_none());
        assert!(h.blocks.borrow().is_empty());
    }

    #[test]
    fn redirect_off_the_allow_list_is_not_followed() {
        use std::io::{ErrorKind, Read};
        use std::net::TcpListener;

        let target = TcpListener::bind("127.0.0.1:0").unwrap();
        target.set_nonblocking(true).unwrap();
        let target_port = target.local_addr().unwrap().port();

        let front = TcpListener::bind("127.0.0.1:0").unwrap();
        let front_port = front.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = front.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 302 Found\r\nLocation: http://localhost:{target_port}/secret\r\n\
                 Content-Length: 0\r\nConnection: close\r\n\r\n"
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        let file = material("");
        let config = HarnessConfig {
            http: HttpConfig {
                allowed_hosts: vec!["127.0.0.1".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let h = Harness::new(file.path().to_path_buf(), None, config).unwrap();

        let url = format!("http://127.0.0.1:{front_port}/start");
        let err = http_get(&Host::new(&h), &url).unwrap_err();
        server.join().unwrap();

        assert!(err.to_string().contains("not in the HTTP allow-list"));
        assert!(matches!(
            target.accept().map_err(|e| e.kind()),
            Err(ErrorKind::WouldBlock)
        ));
    }
}
