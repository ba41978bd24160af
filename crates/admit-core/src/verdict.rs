//! Host-side consumption of what a policy emitted.
//!
//! A host must see exactly one well-formed verdict per invocation. Anything
//! else, including silence, is a protocol error and fails closed. The one
//! exception is a failed `Execute`: the execution wrapper emits its error
//! verdict last, after whatever the body already emitted.

use serde::Serialize;
use thiserror::Error;

use crate::result::{PolicyResult, ResultWire, WireError};
use crate::run::ExitCode;

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("policy emitted no result")]
    NoOutput,

    #[error("policy emitted {0} results; exactly one is allowed")]
    MultipleOutputs(usize),

    #[error("policy output is not a valid result object")]
    Json(#[from] serde_json::Error),

    #[error("policy output is inconsistent")]
    Inconsistent(#[from] WireError),
}

/// Decodes a single emitted payload.
pub fn decode_output(bytes: &[u8]) -> Result<PolicyResult, VerdictError> {
    let wire: ResultWire = serde_json::from_slice(bytes)?;
    Ok(wire.into_result()?)
}

/// Decodes everything one invocation emitted.
pub fn decode_outputs(outputs: &[Vec<u8>]) -> Result<PolicyResult, VerdictError> {
    match outputs {
        [] => Err(VerdictError::NoOutput),
        [only] => decode_output(only),
        many => Err(VerdictError::MultipleOutputs(many.len())),
    }
}

/// Decodes an invocation's outputs in light of how `Execute` exited.
///
/// On `ExitCode::Failure` the last output is the synthesized error verdict
/// and supersedes anything earlier.
pub fn decode_run(outputs: &[Vec<u8>], exit: ExitCode) -> Result<PolicyResult, VerdictError> {
    match (exit, outputs.last()) {
        (ExitCode::Success, _) => decode_outputs(outputs),
        (ExitCode::Failure, Some(last)) => decode_output(last),
        (ExitCode::Failure, None) => Err(VerdictError::NoOutput),
    }
}

/// What the host does with a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Enforcement {
    /// Success or skip.
    Allow,
    /// Failure the policy asked the host to ignore.
    Warn,
    Deny,
}

impl Enforcement {
    pub fn of(result: &PolicyResult) -> Self {
        match (result.is_failure(), result.ignore()) {
            (false, _) => Enforcement::Allow,
            (true, true) => Enforcement::Warn,
            (true, false) => Enforcement::Deny,
        }
    }

    /// Process exit code a host CLI reports for this enforcement.
    pub fn exit_code(self) -> i32 {
        match self {
            Enforcement::Allow | Enforcement::Warn => 0,
            Enforcement::Deny => 1,
        }
    }
}

impl std::fmt::Display for Enforcement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Enforcement::Allow => "ALLOW",
            Enforcement::Warn => "WARN",
            Enforcement::Deny => "DENY",
        })
    }
}
