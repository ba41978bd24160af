//! wasm32 bindings: the host ports over the raw `admit_host` imports.
//!
//! Policy crates normally only touch this through [`export_policy!`].
//!
//! [`export_policy!`]: crate::export_policy

use crate::error::HostError;
use crate::host::{
    ConfigPort, DiscoverPort, HttpPort, HttpRequest, HttpResponse, InputPort, LogLevel, LogPort,
    MemoryPort, OutputPort,
};

mod sys {
    #[link(wasm_import_module = "admit_host")]
    unsafe extern "C" {
        pub fn material() -> u64;
        pub fn config_get(key_ptr: u32, key_len: u32) -> u64;
        pub fn output_set(ptr: u32, len: u32);
        pub fn log(level: u32, ptr: u32, len: u32);
        pub fn http_request(req_ptr: u32, req_len: u32) -> u64;
        pub fn discover(digest_ptr: u32, digest_len: u32, kind_ptr: u32, kind_len: u32) -> u64;
        pub fn block_length(handle: u64) -> u64;
        pub fn block_read(handle: u64, dst_ptr: u32, len: u32) -> u32;
        pub fn block_free(handle: u64);
        pub fn last_error() -> u64;
    }
}

/// The host as seen from inside a policy module.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmHost;

fn ptr_len(bytes: &[u8]) -> (u32, u32) {
    (bytes.as_ptr() as u32, bytes.len() as u32)
}

/// Copies a host block into guest memory and releases it.
fn take_block(handle: u64) -> Option<Vec<u8>> {
    if handle == 0 {
        return None;
    }

    // SAFETY: the buffer is sized to the length the host reports and the
    // host writes at most `len` bytes into it.
    let bytes = unsafe {
        let len = sys::block_length(handle) as usize;
        let mut buf = vec![0u8; len];
        let (ptr, len) = (buf.as_mut_ptr() as u32, buf.len() as u32);
        let written = sys::block_read(handle, ptr, len) as usize;
        sys::block_free(handle);
        buf.truncate(written);
        buf
    };

    Some(bytes)
}

fn last_host_error(fallback: &str) -> HostError {
    // SAFETY: no arguments; returns a handle or 0.
    let handle = unsafe { sys::last_error() };
    take_block(handle)
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .map(HostError::new)
        .unwrap_or_else(|| HostError::new(fallback))
}

impl InputPort for WasmHost {
    fn input(&self) -> Result<Vec<u8>, HostError> {
        // SAFETY: no arguments; returns a handle or 0.
        let handle = unsafe { sys::material() };
        take_block(handle).ok_or_else(|| last_host_error("host returned no material"))
    }
}

impl ConfigPort for WasmHost {
    fn get(&self, key: &str) -> Option<String> {
        let (ptr, len) = ptr_len(key.as_bytes());
        // SAFETY: `key` outlives the call.
        let handle = unsafe { sys::config_get(ptr, len) };
        take_block(handle).and_then(|bytes| String::from_utf8(bytes).ok())
    }
}

impl OutputPort for WasmHost {
    fn emit(&self, bytes: &[u8]) {
        let (ptr, len) = ptr_len(bytes);
        // SAFETY: `bytes` outlives the call.
        unsafe { sys::output_set(ptr, len) }
    }
}

impl HttpPort for WasmHost {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HostError> {
        let payload =
            serde_json::to_vec(request).map_err(|err| HostError::new(err.to_string()))?;
        let (ptr, len) = ptr_len(&payload);
        // SAFETY: `payload` outlives the call.
        let handle = unsafe { sys::http_request(ptr, len) };

        let bytes = take_block(handle).ok_or_else(|| last_host_error("HTTP request failed"))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| HostError::new(format!("malformed HTTP response from host: {err}")))
    }
}

impl DiscoverPort for WasmHost {
    fn discover(&self, digest: &str, kind: &str) -> u64 {
        let (d_ptr, d_len) = ptr_len(digest.as_bytes());
        let (k_ptr, k_len) = ptr_len(kind.as_bytes());
        // SAFETY: both strings outlive the call.
        unsafe { sys::discover(d_ptr, d_len, k_ptr, k_len) }
    }
}

impl MemoryPort for WasmHost {
    fn read(&self, handle: u64) -> Option<Vec<u8>> {
        take_block(handle)
    }
}

impl LogPort for WasmHost {
    fn log(&self, level: LogLevel, message: &str) {
        let (ptr, len) = ptr_len(message.as_bytes());
        // SAFETY: `message` outlives the call.
        unsafe { sys::log(level.code(), ptr, len) }
    }
}

/// Exports `Execute` for a policy function.
///
/// ```ignore
/// fn check(host: &admit_core::Host<'_>) -> anyhow::Result<()> {
///     admit_core::output_result(host, &admit_core::PolicyResult::success())?;
///     Ok(())
/// }
///
/// admit_core::export_policy!(check);
/// ```
///
/// The generated entry point installs a [`HostLogger`] on first use so
/// `log::info!` and friends reach the host.
///
/// [`HostLogger`]: crate::logging::HostLogger
#[macro_export]
macro_rules! export_policy {
    ($policy:path) => {
        #[allow(non_snake_case)]
        #[unsafe(no_mangle)]
        pub extern "C" fn Execute() -> i32 {
            let _ = $crate::logging::init_logger(
                $crate::guest::WasmHost,
                $crate::logging::LevelFilter::Debug,
            );
            let ports = $crate::guest::WasmHost;
            let host = $crate::Host::new(&ports);
            $crate::run(&host, $policy).as_i32()
        }
    };
}
