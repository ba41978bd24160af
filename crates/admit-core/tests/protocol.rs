//! End-to-end behaviour of the policy execution contract, driven through
//! the in-memory host.

use admit_core::result::ResultWire;
use admit_core::testing::FakeHost;
use admit_core::verdict::{Enforcement, VerdictError, decode_outputs, decode_run};
use admit_core::{
    Host, PolicyResult, SdkError, args, discover_by_digest, http_get_json, material_digest,
    material_json, output_result, run,
};
use anyhow::{Context, bail};
use serde_json::json;

const IMAGE: &[u8] = br#"{"name":"registry.example.com/app","tag":"1.4.2","labels":{"team":"payments"}}"#;

/// Fails unless every label listed in the `labels` argument is present.
fn required_labels(host: &Host<'_>) -> anyhow::Result<()> {
    let doc = material_json(host)?;
    let wanted = args(host)?.list("labels");
    if wanted.is_empty() {
        return Ok(output_result(host, &PolicyResult::skip("no labels required"))?);
    }

    let mut result = PolicyResult::success();
    for label in wanted {
        if doc["labels"].get(&label).is_none() {
            result.add_violation(format!("missing label {label}"));
        }
    }
    output_result(host, &result)?;
    Ok(())
}

fn emitted(fake: &FakeHost) -> ResultWire {
    serde_json::from_slice(&fake.outputs()[0]).expect("emitted result is valid JSON")
}

#[test]
fn passing_policy_emits_success_and_exits_0() {
    let fake = FakeHost::new()
        .with_material(IMAGE)
        .with_args(r#"{"labels":["team"]}"#);

    let code = run(&Host::new(&fake), required_labels);

    assert_eq!(code.as_i32(), 0);
    let wire = emitted(&fake);
    assert!(!wire.skipped);
    assert!(wire.violations.is_empty());
    assert_eq!(wire.skip_reason, "");
    assert!(!wire.ignore);
}

#[test]
fn failing_policy_still_exits_0() {
    let fake = FakeHost::new()
        .with_material(IMAGE)
        .with_args(r#"{"labels":"team, owner, tier"}"#);

    let code = run(&Host::new(&fake), required_labels);

    assert_eq!(code.as_i32(), 0);
    assert_eq!(
        emitted(&fake).violations,
        vec!["missing label owner", "missing label tier"]
    );

    let result = decode_outputs(&fake.outputs()).unwrap();
    assert_eq!(Enforcement::of(&result), Enforcement::Deny);
}

#[test]
fn skipping_policy_reports_reason() {
    let fake = FakeHost::new().with_material(IMAGE);

    run(&Host::new(&fake), required_labels);

    let wire = emitted(&fake);
    assert!(wire.skipped);
    assert_eq!(wire.skip_reason, "no labels required");
}

#[test]
fn malformed_material_becomes_execution_error() {
    let fake = FakeHost::new().with_material(&b"<xml/>"[..]);

    let code = run(&Host::new(&fake), required_labels);

    assert_eq!(code.as_i32(), 1);
    let wire = emitted(&fake);
    assert_eq!(wire.violations.len(), 1);
    assert!(
        wire.violations[0].starts_with("Policy execution error: failed to parse material as JSON")
    );
}

#[test]
fn thrown_error_has_exact_output_shape() {
    let fake = FakeHost::new();

    let code = run(&Host::new(&fake), |_| bail!("registry unreachable"));

    assert_eq!(code.as_i32(), 1);
    assert_eq!(
        fake.last_output_json().unwrap(),
        json!({
            "skipped": false,
            "violations": ["Policy execution error: registry unreachable"],
            "skip_reason": "",
            "ignore": false
        })
    );
}

#[test]
fn http_404_aborts_before_parsing() {
    let url = "https://vulns.example.com/api/image";
    let fake = FakeHost::new().with_http_response("GET", url, 404, "<html>not found</html>");

    let code = run(&Host::new(&fake), |host| {
        let report = http_get_json(host, url).context("fetching vulnerability report")?;
        output_result(host, &PolicyResult::fail([report.to_string()]))?;
        Ok(())
    });

    assert_eq!(code.as_i32(), 1);
    let violation = &emitted(&fake).violations[0];
    assert!(violation.contains("404"));
    assert!(!violation.contains("parse"));
}

#[test]
fn discovery_without_backend_is_an_error_not_an_empty_result() {
    let digest = material_digest(IMAGE);
    let fake = FakeHost::new().with_material(IMAGE);
    let host = Host::new(&fake);

    let err = discover_by_digest(&host, &digest).unwrap_err();

    assert!(matches!(err, SdkError::DiscoverUnavailable { .. }));
    assert!(err.to_string().contains("connectivity"));
}

#[test]
fn discovery_drives_verdict() {
    let digest = material_digest(IMAGE);
    let payload = json!({
        "digest": digest,
        "kind": "CONTAINER_IMAGE",
        "references": [{"digest": "sha256:0a1b", "kind": "ATTESTATION", "metadata": {}}]
    })
    .to_string();
    let fake = FakeHost::new()
        .with_material(IMAGE)
        .with_discovery(&digest, "", payload);

    let code = run(&Host::new(&fake), |host| {
        let material = admit_core::material_bytes(host)?;
        let found = discover_by_digest(host, &material_digest(&material))?;
        let mut result = PolicyResult::success();
        if found.references_of_kind("ATTESTATION").next().is_none() {
            result.add_violation("image has no attestation");
        }
        output_result(host, &result)?;
        Ok(())
    });

    assert_eq!(code.as_i32(), 0);
    assert!(emitted(&fake).violations.is_empty());
}

#[test]
fn silent_policy_exits_0_but_host_rejects_it() {
    let fake = FakeHost::new().with_material(IMAGE);

    let code = run(&Host::new(&fake), |host| {
        material_json(host)?;
        Ok(())
    });

    assert_eq!(code.as_i32(), 0);
    assert!(matches!(
        decode_outputs(&fake.outputs()),
        Err(VerdictError::NoOutput)
    ));
}

#[test]
fn double_emission_is_rejected_by_host() {
    let fake = FakeHost::new();

    run(&Host::new(&fake), |host| {
        output_result(host, &PolicyResult::success())?;
        output_result(host, &PolicyResult::fail(["late"]))?;
        Ok(())
    });

    assert!(matches!(
        decode_outputs(&fake.outputs()),
        Err(VerdictError::MultipleOutputs(2))
    ));
}

#[test]
fn ignored_failure_is_only_a_warning() {
    let fake = FakeHost::new();

    run(&Host::new(&fake), |host| {
        output_result(host, &PolicyResult::fail(["advisory"]).with_ignore(true))?;
        Ok(())
    });

    let result = decode_outputs(&fake.outputs()).unwrap();
    assert_eq!(Enforcement::of(&result), Enforcement::Warn);
}

#[test]
fn error_after_emitting_is_decoded_as_the_error_verdict() {
    let fake = FakeHost::new();

    let code = run(&Host::new(&fake), |host| {
        output_result(host, &PolicyResult::success())?;
        bail!("late failure")
    });

    assert_eq!(code.as_i32(), 1);
    assert_eq!(fake.outputs().len(), 2);
    let result = decode_run(&fake.outputs(), code).unwrap();
    assert_eq!(result.violations(), ["Policy execution error: late failure"]);
    assert_eq!(Enforcement::of(&result), Enforcement::Deny);
}
