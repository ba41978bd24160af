//! Compatibility verdict for a policy module.
//!
//! - Analysis status other than `ok` → incompatible
//! - Any `Error` rule                → incompatible
//! - Otherwise                       → compatible (warnings allowed)
//!
//! Exit codes: compatible → 0, incompatible → 1.

use crate::report::model::{AnalysisInfo, CompatibilityInfo};
use crate::rules::catalog::{RuleId, Severity};
use crate::rules::eval::TriggeredRule;

pub fn classify(analysis: &AnalysisInfo, triggered: &[TriggeredRule]) -> CompatibilityInfo {
    let highest = triggered.iter().map(|r| r.severity).max();

    let mut triggered_rule_ids: Vec<RuleId> = triggered.iter().map(|r| r.rule_id).collect();
    triggered_rule_ids.sort();

    let (compatible, reason) = if analysis.status != "ok" {
        (false, format!("module analysis status is {}", analysis.status))
    } else if highest == Some(Severity::Error) {
        (false, "module violates the host ABI".to_string())
    } else if highest == Some(Severity::Warn) {
        (true, "module is loadable; review warnings".to_string())
    } else {
        (true, "module matches the host ABI".to_string())
    };

    CompatibilityInfo {
        compatible,
        reason,
        highest_severity: highest.map_or_else(|| "NONE".to_string(), |s| format!("{s:?}").to_uppercase()),
        triggered_rule_ids,
        exit_code: if compatible { 0 } else { 1 },
    }
}
