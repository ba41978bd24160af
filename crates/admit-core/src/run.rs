//! Execution wrapper around a policy body.
//!
//! `run` is the last line of defence: any error or panic escaping the body
//! becomes a single synthetic violation, emitted in place of whatever the
//! body was building.

use std::panic::{self, AssertUnwindSafe};

use crate::host::Host;
use crate::output::output_result;
use crate::result::PolicyResult;

/// Prefix of the violation synthesized for a failed policy body.
pub const EXECUTION_ERROR_PREFIX: &str = "Policy execution error: ";

/// Status returned to the host from `Execute`.
///
/// Orthogonal to the verdict: a policy that cleanly reports violations
/// still exits with `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Failure,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
        }
    }
}

/// Runs `policy` against `host`.
///
/// - `Ok(())`: returns `ExitCode::Success` without inspecting what, if
///   anything, was emitted. A body that emitted nothing is logged at `warn`;
///   the host decides what a missing verdict means.
/// - `Err(e)` or a panic: logs the error, emits
///   `fail(["Policy execution error: <message>"])` and returns
///   `ExitCode::Failure`. Violations the body had not emitted yet are lost.
pub fn run<F>(host: &Host<'_>, policy: F) -> ExitCode
where
    F: FnOnce(&Host<'_>) -> anyhow::Result<()>,
{
    let emitted_before = host.emitted();

    let message = match panic::catch_unwind(AssertUnwindSafe(|| policy(host))) {
        Ok(Ok(())) => {
            if host.emitted() == emitted_before {
                host.warn("policy completed without emitting a result");
            }
            return ExitCode::Success;
        }
        Ok(Err(err)) => format!("{err:#}"),
        Err(payload) => panic_message(payload.as_ref()),
    };

    host.error(&format!("policy execution failed: {message}"));

    let result = PolicyResult::fail([format!("{EXECUTION_ERROR_PREFIX}{message}")]);
    if let Err(err) = output_result(host, &result) {
        host.error(&format!(
            "failed to emit error result: {:#}",
            anyhow::Error::new(err)
        ));
    }

    ExitCode::Failure
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "policy panicked".to_string()
    }
}
