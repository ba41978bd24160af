//! SDK for writing admission policies that compile to WebAssembly, plus
//! the host-side pieces of the same contract.
//!
//! A policy reads its material and arguments, optionally calls back into
//! the host, and emits exactly one [`PolicyResult`]:
//!
//! ```
//! use admit_core::testing::FakeHost;
//! use admit_core::{Host, PolicyResult, args, material_json, output_result, run};
//!
//! fn require_name(host: &Host<'_>) -> anyhow::Result<()> {
//!     let doc = material_json(host)?;
//!     let field = args(host)?.string_or("field", "name");
//!
//!     let mut result = PolicyResult::success();
//!     if doc.get(&field).is_none() {
//!         result.add_violation(format!("missing field `{field}`"));
//!     }
//!     output_result(host, &result)?;
//!     Ok(())
//! }
//!
//! let fake = FakeHost::new().with_material(b"{}".to_vec());
//! assert_eq!(run(&Host::new(&fake), require_name).as_i32(), 0);
//! assert_eq!(fake.last_output_json().unwrap()["violations"][0], "missing field `name`");
//! ```

use std::path::Path;

use anyhow::Result;

pub mod abi;
pub mod args;
pub mod digest;
pub mod discover;
pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod guest;
pub mod host;
pub mod http;
pub mod logging;
pub mod material;
pub mod output;
pub mod report;
pub mod result;
pub mod rules;
pub mod run;
pub mod testing;
pub mod verdict;
pub mod wasm;

pub use args::{Args, args, args_as};
pub use digest::material_digest;
pub use discover::{DiscoverReference, DiscoverResult, discover, discover_by_digest};
pub use error::{HostError, SdkError, SdkResult};
pub use host::{Host, HostBuilder, HostPorts};
pub use http::{http_get, http_get_as, http_get_json, http_post, http_post_json};
pub use material::{material_as, material_bytes, material_json, material_string};
pub use output::output_result;
pub use result::{PolicyResult, Verdict};
pub use run::{ExitCode, run};

use crate::report::model::{InspectReport, InterfaceInfo, ToolInfo};
use crate::wasm::module::PolicyModule;

pub const TOOL_NAME: &str = "admit";

/// JSON schema version of inspection reports.
/// Bump only when the report shape changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Inspects a compiled policy module on disk.
pub fn inspect(path: &Path, tool: ToolInfo) -> Result<InspectReport> {
    inspect_module(&PolicyModule::load(path)?, tool)
}

/// Inspects an in-memory policy module.
pub fn inspect_bytes(bytes: Vec<u8>, tool: ToolInfo) -> Result<InspectReport> {
    inspect_module(&PolicyModule::from_bytes(bytes), tool)
}

fn inspect_module(module: &PolicyModule, tool: ToolInfo) -> Result<InspectReport> {
    let facts = wasm::parse::parse_wasm(&module.bytes)?;

    // A module that failed to parse has no trustworthy interface to check.
    let triggered = if facts.analysis.status == "ok" {
        rules::eval::evaluate(&facts.sections)
    } else {
        Vec::new()
    };
    let compatibility = rules::classify::classify(&facts.analysis, &triggered);
    log::debug!(
        "inspected module: status={} triggered={}",
        facts.analysis.status,
        triggered.len()
    );

    Ok(InspectReport::new(
        tool,
        module.artifact_info(),
        InterfaceInfo::from_sections(&facts.sections),
        facts.analysis,
        triggered,
        compatibility,
    ))
}
