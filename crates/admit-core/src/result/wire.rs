use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::model::{PolicyResult, Verdict};

/// The JSON object a policy writes to its output channel.
///
/// Shape: `{skipped, violations, skip_reason, ignore}`. Missing fields
/// decode to their defaults so hosts accept terse payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultWire {
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub violations: Vec<String>,
    #[serde(default)]
    pub skip_reason: String,
    #[serde(default)]
    pub ignore: bool,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("result is marked skipped but carries {0} violation(s)")]
    SkippedWithViolations(usize),
}

impl ResultWire {
    /// Lifts a wire object into a typed result.
    ///
    /// `{skipped:false, violations:[]}` decodes as success; the wire cannot
    /// distinguish it from an empty `fail()`.
    pub fn into_result(self) -> Result<PolicyResult, WireError> {
        let verdict = match (self.skipped, self.violations.is_empty()) {
            (true, false) => return Err(WireError::SkippedWithViolations(self.violations.len())),
            (true, true) => Verdict::Skipped(self.skip_reason),
            (false, true) => Verdict::Success,
            (false, false) => Verdict::Failure(self.violations),
        };

        Ok(PolicyResult::from_verdict(verdict).with_ignore(self.ignore))
    }
}

impl From<&PolicyResult> for ResultWire {
    fn from(result: &PolicyResult) -> Self {
        result.to_wire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_to_fixed_shape() {
        let value = serde_json::to_value(PolicyResult::success().to_wire()).unwrap();

        assert_eq!(
            value,
            json!({"skipped": false, "violations": [], "skip_reason": "", "ignore": false})
        );
    }

    #[test]
    fn missing_fields_default() {
        let wire: ResultWire = serde_json::from_value(json!({"violations": ["x"]})).unwrap();
        let result = wire.into_result().unwrap();

        assert_eq!(result.violations(), ["x"]);
        assert!(!result.ignore());
    }

    #[test]
    fn skipped_with_violations_is_rejected() {
        let wire = ResultWire {
            skipped: true,
            violations: vec!["a".into(), "b".into()],
            ..Default::default()
        };

        assert_eq!(
            wire.into_result(),
            Err(WireError::SkippedWithViolations(2))
        );
    }

    #[test]
    fn skip_reason_is_dropped_for_non_skipped_results() {
        let wire = ResultWire {
            skip_reason: "stale".into(),
            ..Default::default()
        };

        let result = wire.into_result().unwrap();
        assert!(result.is_success());
        assert_eq!(result.skip_reason(), "");
    }
}
