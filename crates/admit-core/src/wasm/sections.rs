use anyhow::Result;
use wasmparser::{ExportSectionReader, ExternalKind, ImportSectionReader, MemorySectionReader, TypeRef};

/// Field order is sort order: `(module, name, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportFact {
    pub module: String,
    pub name: String,
    pub kind: String, // "func"|"memory"|"table"|"global"|"tag"
}

/// Field order is sort order: `(name, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExportFact {
    pub name: String,
    pub kind: String,
}

/// Interface facts of a policy module: what it imports, what it exports,
/// and whether it owns a linear memory.
#[derive(Debug, Clone, Default)]
pub struct SectionFacts {
    pub imports: Vec<ImportFact>,
    pub exports: Vec<ExportFact>,
    pub defined_memory_count: u32,
    pub imported_memory_count: u32,
}

impl SectionFacts {
    pub fn export(&self, name: &str) -> Option<&ExportFact> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// Sorts both lists so identical modules yield identical reports,
    /// whatever order their sections listed entries in.
    pub fn finalize(&mut self) {
        self.imports.sort();
        self.exports.sort();
    }
}

fn type_ref_kind(ty: &TypeRef) -> &'static str {
    match ty {
        TypeRef::Func(_) | TypeRef::FuncExact(_) => "func",
        TypeRef::Table(_) => "table",
        TypeRef::Memory(_) => "memory",
        TypeRef::Global(_) => "global",
        TypeRef::Tag(_) => "tag",
    }
}

fn external_kind(kind: ExternalKind) -> &'static str {
    match kind {
        ExternalKind::Func | ExternalKind::FuncExact => "func",
        ExternalKind::Table => "table",
        ExternalKind::Memory => "memory",
        ExternalKind::Global => "global",
        ExternalKind::Tag => "tag",
    }
}

pub fn on_import_section(facts: &mut SectionFacts, reader: ImportSectionReader<'_>) -> Result<()> {
    for import in reader.into_imports() {
        let import = import?;
        if matches!(import.ty, TypeRef::Memory(_)) {
            facts.imported_memory_count = facts.imported_memory_count.saturating_add(1);
        }
        facts.imports.push(ImportFact {
            module: import.module.to_string(),
            name: import.name.to_string(),
            kind: type_ref_kind(&import.ty).to_string(),
        });
    }
    Ok(())
}

pub fn on_export_section(facts: &mut SectionFacts, reader: ExportSectionReader<'_>) -> Result<()> {
    for export in reader {
        let export = export?;
        facts.exports.push(ExportFact {
            name: export.name.to_string(),
            kind: external_kind(export.kind).to_string(),
        });
    }
    Ok(())
}

pub fn on_memory_section(facts: &mut SectionFacts, reader: MemorySectionReader<'_>) -> Result<()> {
    facts.defined_memory_count = facts.defined_memory_count.saturating_add(reader.count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(module: &str, name: &str, kind: &str) -> ImportFact {
        ImportFact {
            module: module.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }

    fn export(name: &str, kind: &str) -> ExportFact {
        ExportFact {
            name: name.into(),
            kind: kind.into(),
        }
    }

    #[test]
    fn finalize_orders_imports_and_exports() {
        let mut facts = SectionFacts {
            imports: vec![
                import("wasi_snapshot_preview1", "fd_write", "func"),
                import("admit_host", "output_set", "func"),
                import("admit_host", "discover", "global"),
                import("admit_host", "discover", "func"),
            ],
            exports: vec![
                export("memory", "memory"),
                export("Execute", "func"),
                export("_initialize", "func"),
            ],
            ..Default::default()
        };

        facts.finalize();

        assert_eq!(
            facts.imports,
            vec![
                import("admit_host", "discover", "func"),
                import("admit_host", "discover", "global"),
                import("admit_host", "output_set", "func"),
                import("wasi_snapshot_preview1", "fd_write", "func"),
            ]
        );
        let names: Vec<&str> = facts.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Execute", "_initialize", "memory"]);
    }

    #[test]
    fn export_lookup_is_by_exact_name() {
        let facts = SectionFacts {
            exports: vec![export("Execute", "func")],
            ..Default::default()
        };

        assert_eq!(facts.export("Execute").map(|e| e.kind.as_str()), Some("func"));
        assert!(facts.export("execute").is_none());
    }
}
