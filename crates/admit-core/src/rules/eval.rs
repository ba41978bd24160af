use serde_json::json;

use crate::abi;
use crate::rules::catalog::{RuleId, Severity};
use crate::wasm::sections::SectionFacts;

#[derive(Debug, Clone)]
pub struct TriggeredRule {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub evidence: serde_json::Value,
}

impl TriggeredRule {
    fn new(rule_id: RuleId, message: impl Into<String>, evidence: serde_json::Value) -> Self {
        Self {
            rule_id,
            severity: rule_id.severity(),
            title: rule_id.title().to_string(),
            message: message.into(),
            evidence,
        }
    }
}

/// Checks a module's interface against the host ABI.
///
/// Each rule fires at most once; offending names are collected into its
/// evidence.
pub fn evaluate(sections: &SectionFacts) -> Vec<TriggeredRule> {
    let mut triggered = Vec::new();

    match sections.export(abi::EXECUTE_EXPORT) {
        None => triggered.push(TriggeredRule::new(
            RuleId::ExecMissing,
            format!("module does not export `{}`", abi::EXECUTE_EXPORT),
            json!({ "export": abi::EXECUTE_EXPORT }),
        )),
        Some(export) if export.kind != "func" => triggered.push(TriggeredRule::new(
            RuleId::ExecNotFunction,
            format!("`{}` is exported as a {}", abi::EXECUTE_EXPORT, export.kind),
            json!({ "export": abi::EXECUTE_EXPORT, "kind": export.kind }),
        )),
        Some(_) => {}
    }

    let exports_memory = sections
        .export(abi::MEMORY_EXPORT)
        .is_some_and(|e| e.kind == "memory");
    if !exports_memory {
        triggered.push(TriggeredRule::new(
            RuleId::MemoryNotExported,
            format!("module does not export its linear memory as `{}`", abi::MEMORY_EXPORT),
            json!({ "export": abi::MEMORY_EXPORT }),
        ));
    }

    let unknown: Vec<&str> = sections
        .imports
        .iter()
        .filter(|i| i.module == abi::HOST_MODULE)
        .filter(|i| i.kind != "func" || !abi::is_host_function(&i.name))
        .map(|i| i.name.as_str())
        .collect();
    if !unknown.is_empty() {
        triggered.push(TriggeredRule::new(
            RuleId::UnknownHostImport,
            format!(
                "module imports {} item(s) the host does not provide: {}",
                unknown.len(),
                unknown.join(", ")
            ),
            json!({ "module": abi::HOST_MODULE, "names": unknown }),
        ));
    }

    let foreign: Vec<String> = sections
        .imports
        .iter()
        .filter(|i| i.module != abi::HOST_MODULE)
        .map(|i| format!("{}::{}", i.module, i.name))
        .collect();
    if !foreign.is_empty() {
        triggered.push(TriggeredRule::new(
            RuleId::ForeignImport,
            format!(
                "module imports {} item(s) from outside `{}`",
                foreign.len(),
                abi::HOST_MODULE
            ),
            json!({ "imports": foreign }),
        ));
    }

    triggered
}
