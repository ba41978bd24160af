//! The import/export surface shared by policy modules and their host.
//!
//! Memory handles are `u64` ids of host-owned blocks; `0` means "no block".
//! Pointers and lengths are wasm32 linear-memory offsets.

/// Import module namespace for every host function.
pub const HOST_MODULE: &str = "admit_host";

/// Entry point the host calls once per evaluation. Returns the exit code.
pub const EXECUTE_EXPORT: &str = "Execute";

/// Linear memory the host reads and writes through.
pub const MEMORY_EXPORT: &str = "memory";

/// A host function and its signature, for documentation and checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFunction {
    pub name: &'static str,
    pub signature: &'static str,
}

/// Functions exported by the host under [`HOST_MODULE`].
pub const HOST_FUNCTIONS: &[HostFunction] = &[
    HostFunction {
        name: "material",
        signature: "() -> i64",
    },
    HostFunction {
        name: "config_get",
        signature: "(key_ptr: i32, key_len: i32) -> i64",
    },
    HostFunction {
        name: "output_set",
        signature: "(ptr: i32, len: i32)",
    },
    HostFunction {
        name: "log",
        signature: "(level: i32, ptr: i32, len: i32)",
    },
    HostFunction {
        name: "http_request",
        signature: "(req_ptr: i32, req_len: i32) -> i64",
    },
    HostFunction {
        name: "discover",
        signature: "(digest_ptr: i32, digest_len: i32, kind_ptr: i32, kind_len: i32) -> i64",
    },
    HostFunction {
        name: "block_length",
        signature: "(handle: i64) -> i64",
    },
    HostFunction {
        name: "block_read",
        signature: "(handle: i64, dst_ptr: i32, len: i32) -> i32",
    },
    HostFunction {
        name: "block_free",
        signature: "(handle: i64)",
    },
    HostFunction {
        name: "last_error",
        signature: "() -> i64",
    },
];

pub fn is_host_function(name: &str) -> bool {
    HOST_FUNCTIONS.iter().any(|f| f.name == name)
}
