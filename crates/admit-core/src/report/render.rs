use crate::TOOL_NAME;
use crate::report::model::InspectReport;
use crate::result::PolicyResult;
use crate::verdict::Enforcement;

pub fn render_text(report: &InspectReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", TOOL_NAME, report.tool.version));
    out.push_str(&format!("Module: {}\n", report.digest()));
    out.push_str(&format!("Size: {} bytes\n", report.artifact.size_bytes));
    out.push_str(&format!("Analysis: {}\n", report.analysis.status));
    out.push_str(&format!(
        "Compatible: {}\n",
        if report.compatibility.compatible { "yes" } else { "no" }
    ));
    if !report.interface.host_imports.is_empty() {
        out.push_str(&format!(
            "Host imports: {}\n",
            report.interface.host_imports.join(", ")
        ));
    }
    out.push_str("Triggered rules:\n");
    for r in &report.rules.triggered {
        out.push_str(&format!("  - {} [{}] {}\n", r.rule_id, r.severity, r.title));
    }
    out
}

pub fn render_verdict_text(result: &PolicyResult) -> String {
    let enforcement = Enforcement::of(result);
    let mut out = format!("Enforcement: {enforcement}\n");

    if result.is_success() {
        out.push_str("Result: success\n");
    } else if result.is_skipped() {
        out.push_str(&format!("Result: skipped ({})\n", result.skip_reason()));
    } else {
        out.push_str("Result: failure\n");
        if result.ignore() {
            out.push_str("Ignored: yes\n");
        }
        out.push_str("Violations:\n");
        for v in result.violations() {
            out.push_str(&format!("  - {v}\n"));
        }
    }
    out
}
