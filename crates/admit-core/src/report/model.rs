use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::rules::catalog::RuleId;
use crate::rules::eval::TriggeredRule;
use crate::abi;
use crate::wasm::sections::SectionFacts;

/// Module inspection report.
///
/// Stable JSON contract; deterministic for identical input modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectReport {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub artifact: ArtifactInfo,
    pub interface: InterfaceInfo,
    pub analysis: AnalysisInfo,
    pub rules: RulesInfo,
    pub compatibility: CompatibilityInfo,
}

impl InspectReport {
    /// Assembles a report from pipeline outputs. Sorts `triggered` by id.
    pub fn new(
        tool: ToolInfo,
        artifact: ArtifactInfo,
        interface: InterfaceInfo,
        analysis: AnalysisInfo,
        mut triggered: Vec<TriggeredRule>,
        compatibility: CompatibilityInfo,
    ) -> Self {
        triggered.sort_by(|a, b| a.rule_id.as_str().cmp(b.rule_id.as_str()));

        let rules = RulesInfo {
            triggered: triggered
                .into_iter()
                .map(|r| TriggeredRuleInfo {
                    rule_id: r.rule_id.to_string(),
                    severity: format!("{:?}", r.severity).to_uppercase(),
                    title: r.title,
                    message: r.message,
                    evidence: r.evidence,
                })
                .collect(),
        };

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            artifact,
            interface,
            analysis,
            rules,
            compatibility,
        }
    }

    /// `sha256:<hex>` identity of the inspected module.
    pub fn digest(&self) -> String {
        format!("{}:{}", self.artifact.hash.algorithm, self.artifact.hash.value)
    }
}

/// Tool metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Artifact metadata bound to this report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: Option<String>,
    pub size_bytes: u64,
    pub hash: ArtifactHash,
}

/// Cryptographic artifact fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHash {
    pub algorithm: String,
    pub value: String,
}

/// What the module offers the host and asks of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub exports_execute: bool,
    pub exports_memory: bool,
    /// Functions imported from the host namespace, sorted.
    pub host_imports: Vec<String>,
    pub imports: Vec<ImportItem>,
    pub exports: Vec<ExportItem>,
}

impl InterfaceInfo {
    pub fn from_sections(sections: &SectionFacts) -> Self {
        let exports_kind = |name: &str, kind: &str| {
            sections
                .export(name)
                .is_some_and(|export| export.kind == kind)
        };

        Self {
            exports_execute: exports_kind(abi::EXECUTE_EXPORT, "func"),
            exports_memory: exports_kind(abi::MEMORY_EXPORT, "memory"),
            host_imports: sections
                .imports
                .iter()
                .filter(|i| i.module == abi::HOST_MODULE)
                .map(|i| i.name.clone())
                .collect(),
            imports: sections
                .imports
                .iter()
                .map(|i| ImportItem {
                    module: i.module.clone(),
                    name: i.name.clone(),
                    kind: i.kind.clone(),
                })
                .collect(),
            exports: sections
                .exports
                .iter()
                .map(|e| ExportItem {
                    name: e.name.clone(),
                    kind: e.kind.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportItem {
    pub module: String,
    pub name: String,
    /// External kind: e.g., "func", "memory", "table", "global", "tag".
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportItem {
    pub name: String,
    pub kind: String,
}

/// Parsing/analysis status.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisInfo {
    pub status: String,
    pub warnings: Vec<String>,
}

impl AnalysisInfo {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
            warnings: vec![],
        }
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self {
            status: "parse_error".into(),
            warnings: vec![msg.into()],
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self {
            status: "unsupported".into(),
            warnings: vec![msg.into()],
        }
    }
}

/// Rule evaluation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesInfo {
    pub triggered: Vec<TriggeredRuleInfo>,
}

/// Triggered rule entry included in report output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredRuleInfo {
    pub rule_id: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub evidence: serde_json::Value,
}

/// Final compatibility block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompatibilityInfo {
    pub compatible: bool,
    pub reason: String,
    pub highest_severity: String,
    pub triggered_rule_ids: Vec<RuleId>,
    pub exit_code: i32,
}
