use serde::{Deserialize, Serialize};

/// Stable identifiers of the module-interface checks.
///
/// Variant order is the canonical report order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId {
    #[serde(rename = "ABI-EXEC-01")]
    ExecMissing,
    #[serde(rename = "ABI-EXEC-02")]
    ExecNotFunction,
    #[serde(rename = "ABI-MEM-01")]
    MemoryNotExported,
    #[serde(rename = "ABI-HOST-01")]
    UnknownHostImport,
    #[serde(rename = "ABI-IMPORT-01")]
    ForeignImport,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::ExecMissing => "ABI-EXEC-01",
            RuleId::ExecNotFunction => "ABI-EXEC-02",
            RuleId::MemoryNotExported => "ABI-MEM-01",
            RuleId::UnknownHostImport => "ABI-HOST-01",
            RuleId::ForeignImport => "ABI-IMPORT-01",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            RuleId::ExecMissing
            | RuleId::ExecNotFunction
            | RuleId::MemoryNotExported
            | RuleId::UnknownHostImport => Severity::Error,
            RuleId::ForeignImport => Severity::Warn,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RuleId::ExecMissing => "Missing Execute export",
            RuleId::ExecNotFunction => "Execute is not a function",
            RuleId::MemoryNotExported => "Linear memory not exported",
            RuleId::UnknownHostImport => "Unknown host function",
            RuleId::ForeignImport => "Import outside the host namespace",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Error` makes a module unloadable; `Warn` depends on the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warn,
    Error,
}
