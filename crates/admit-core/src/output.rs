use crate::error::{SdkError, SdkResult};
use crate::host::Host;
use crate::result::PolicyResult;

/// Writes `result` to the host's output channel as
/// `{skipped, violations, skip_reason, ignore}`.
///
/// There is no acknowledgment. Calling this more than once emits more than
/// once; hosts reject invocations that do so.
pub fn output_result(host: &Host<'_>, result: &PolicyResult) -> SdkResult<()> {
    let bytes = serde_json::to_vec(&result.to_wire()).map_err(SdkError::Output)?;
    host.emit(&bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultWire;
    use crate::testing::FakeHost;
    use serde_json::json;

    #[test]
    fn success_round_trips() {
        let fake = FakeHost::new();
        output_result(&Host::new(&fake), &PolicyResult::success()).unwrap();

        let wire: ResultWire = serde_json::from_slice(&fake.outputs()[0]).unwrap();
        assert!(!wire.skipped);
        assert!(wire.violations.is_empty());
        assert_eq!(wire.skip_reason, "");
        assert!(!wire.ignore);
    }

    #[test]
    fn emits_fixed_shape_for_failure() {
        let fake = FakeHost::new();
        let result = PolicyResult::fail(["missing license", "missing license"]).with_ignore(true);
        output_result(&Host::new(&fake), &result).unwrap();

        assert_eq!(
            fake.last_output_json().unwrap(),
            json!({
                "skipped": false,
                "violations": ["missing license", "missing license"],
                "skip_reason": "",
                "ignore": true
            })
        );
    }

    #[test]
    fn emits_skip_reason() {
        let fake = FakeHost::new();
        output_result(&Host::new(&fake), &PolicyResult::skip("not an image")).unwrap();

        let value = fake.last_output_json().unwrap();
        assert_eq!(value["skipped"], true);
        assert_eq!(value["skip_reason"], "not an image");
    }
}
