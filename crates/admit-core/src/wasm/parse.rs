use anyhow::Result;
use wasmparser::{Encoding, Parser, Payload};

use crate::report::model::AnalysisInfo;
use crate::wasm::sections;

/// Interface facts extracted from a compiled policy module.
///
/// Only the module boundary matters here: imports, exports and memory.
/// Function bodies are never decoded.
#[derive(Debug, Clone, Default)]
pub struct ModuleFacts {
    pub sections: sections::SectionFacts,

    /// Parsing status and deterministic warnings.
    pub analysis: AnalysisInfo,
}

/// Parse a policy module and extract its interface facts.
///
/// A single pass over `bytes`:
///
/// 1. Import, export and memory sections feed `wasm::sections`.
/// 2. Component-model payloads mark the analysis unsupported; hosts load
///    core modules only.
/// 3. A parse error stops the pass and is recorded in `analysis`; it is not
///    returned as `Err` so callers still get a report.
pub fn parse_wasm(bytes: &[u8]) -> Result<ModuleFacts> {
    let mut facts = ModuleFacts {
        analysis: AnalysisInfo::ok(),
        ..Default::default()
    };

    for payload in Parser::new(0).parse_all(bytes) {
        match payload {
            Ok(Payload::Version {
                encoding: Encoding::Component,
                ..
            }) => {
                facts.analysis =
                    AnalysisInfo::unsupported("component binaries are not loadable policy modules");
                break;
            }
            Ok(Payload::Version { .. }) => {}

            Ok(Payload::ImportSection(reader)) => {
                sections::on_import_section(&mut facts.sections, reader)?;
            }
            Ok(Payload::ExportSection(reader)) => {
                sections::on_export_section(&mut facts.sections, reader)?;
            }
            Ok(Payload::MemorySection(reader)) => {
                sections::on_memory_section(&mut facts.sections, reader)?;
            }

            Ok(
                other @ (Payload::ComponentSection { .. }
                | Payload::ComponentTypeSection(_)
                | Payload::ComponentImportSection(_)
                | Payload::ComponentExportSection(_)
                | Payload::ComponentCanonicalSection(_)
                | Payload::CoreTypeSection(_)
                | Payload::InstanceSection(_)
                | Payload::ComponentInstanceSection(_)
                | Payload::ComponentAliasSection(_)
                | Payload::ComponentStartSection { .. }
                | Payload::ModuleSection { .. }),
            ) => {
                facts.analysis = AnalysisInfo::unsupported(format!(
                    "component-model payload is not a loadable policy module: {other:?}"
                ));
                break;
            }

            Ok(Payload::End(_)) => {}

            Err(e) => {
                facts.analysis = AnalysisInfo::parse_error(e.to_string());
                break;
            }

            // Types, code, data and custom sections do not affect the host ABI.
            _ => {}
        }
    }

    facts.sections.finalize();

    if facts.analysis.status == "ok"
        && facts.sections.defined_memory_count == 0
        && facts.sections.imported_memory_count > 0
    {
        facts
            .analysis
            .warnings
            .push("module imports its memory instead of defining it".to_string());
    }

    Ok(facts)
}
