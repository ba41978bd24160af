//! Artifact discovery: what the host knows about a content digest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};
use crate::host::Host;

/// One artifact related to the discovered digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverReference {
    pub digest: String,
    pub kind: String,
    /// Opaque to the SDK.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// The host's answer: the root artifact and a flat list of references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverResult {
    pub digest: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub references: Vec<DiscoverReference>,
}

impl DiscoverResult {
    pub fn references_of_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a DiscoverReference> + 'a {
        self.references.iter().filter(move |r| r.kind == kind)
    }

    pub fn find(&self, digest: &str) -> Option<&DiscoverReference> {
        self.references.iter().find(|r| r.digest == digest)
    }
}

/// Asks the host for artifacts related to `digest`, optionally filtered by
/// `kind` (empty string for no filter).
///
/// A zero handle means the host had no backing to answer with; that is an
/// error, never an empty result.
pub fn discover(host: &Host<'_>, digest: &str, kind: &str) -> SdkResult<DiscoverResult> {
    log::debug!("discover digest={digest} kind={kind:?}");

    let handle = host.discovery().discover(digest, kind);
    if handle == 0 {
        return Err(SdkError::DiscoverUnavailable {
            digest: digest.to_string(),
        });
    }

    let bytes = host
        .memory()
        .read(handle)
        .ok_or_else(|| SdkError::DiscoverMemory {
            digest: digest.to_string(),
            handle,
        })?;

    serde_json::from_slice(&bytes).map_err(|source| SdkError::DiscoverJson {
        digest: digest.to_string(),
        source,
    })
}

pub fn discover_by_digest(host: &Host<'_>, digest: &str) -> SdkResult<DiscoverResult> {
    discover(host, digest, "")
}
