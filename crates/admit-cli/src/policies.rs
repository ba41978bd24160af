//! Reference policies the harness can run without a compiled module.
//!
//! They are written against the SDK exactly as a guest policy would be, so
//! `admit eval` exercises the same code paths a WebAssembly build does.

use admit_core::{
    Host, PolicyResult, args, discover, material_bytes, material_digest, material_json,
    output_result,
};
use anyhow::Context;

pub type PolicyFn = fn(&Host<'_>) -> anyhow::Result<()>;

pub struct BuiltinPolicy {
    pub name: &'static str,
    pub summary: &'static str,
    pub body: PolicyFn,
}

pub const BUILTINS: &[BuiltinPolicy] = &[
    BuiltinPolicy {
        name: "required-fields",
        summary: "fail for each top-level field in `fields` missing from the JSON material",
        body: required_fields,
    },
    BuiltinPolicy {
        name: "discover-attestation",
        summary: "fail unless discovery finds a reference of `kind` (default ATTESTATION)",
        body: discover_attestation,
    },
];

pub fn find(name: &str) -> Option<&'static BuiltinPolicy> {
    BUILTINS.iter().find(|p| p.name == name)
}

pub fn names() -> Vec<&'static str> {
    BUILTINS.iter().map(|p| p.name).collect()
}

/// Args: `fields` (list), `advisory` (bool, marks failures ignorable).
fn required_fields(host: &Host<'_>) -> anyhow::Result<()> {
    let args = args(host)?;
    let fields = args.list("fields");
    if fields.is_empty() {
        output_result(host, &PolicyResult::skip("no required fields configured"))?;
        return Ok(());
    }

    let doc = material_json(host)?;
    let mut result = PolicyResult::success();
    match doc.as_object() {
        Some(object) => {
            for field in &fields {
                if !object.contains_key(field) {
                    result.add_violation(format!("missing required field `{field}`"));
                }
            }
        }
        None => result.add_violation("material is not a JSON object"),
    }

    host.info(&format!(
        "checked {} field(s), {} missing",
        fields.len(),
        result.violations().len()
    ));
    output_result(host, &result.with_ignore(args.bool_or("advisory", false)))?;
    Ok(())
}

/// Args: `digest` (defaults to the material digest), `kind`.
fn discover_attestation(host: &Host<'_>) -> anyhow::Result<()> {
    let args = args(host)?;
    let digest = match args.string("digest") {
        Some(digest) => digest,
        None => material_digest(&material_bytes(host)?),
    };
    let kind = args.string_or("kind", "ATTESTATION");

    let found = discover(host, &digest, &kind)
        .with_context(|| format!("discovering {kind} references for {digest}"))?;

    // The host may ignore the kind filter.
    let result = match found.references_of_kind(&kind).next() {
        Some(reference) => {
            host.info(&format!("{digest} has {kind} {}", reference.digest));
            PolicyResult::success()
        }
        None => PolicyResult::fail([format!("no {kind} reference found for {digest}")]),
    };
    output_result(host, &result)?;
    Ok(())
}
