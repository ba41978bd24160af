use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::digest::{DIGEST_ALGORITHM, sha256_hex};
use crate::report::model::{ArtifactHash, ArtifactInfo};

/// Raw bytes of a compiled policy, plus where they came from.
#[derive(Debug, Clone)]
pub struct PolicyModule {
    pub source: Option<String>,
    pub bytes: Vec<u8>,
}

impl PolicyModule {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read policy module: {}", path.display()))?;
        log::debug!("read {} bytes from {}", bytes.len(), path.display());

        Ok(Self {
            source: Some(path.display().to_string()),
            bytes,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            source: None,
            bytes,
        }
    }

    /// Report metadata. The fingerprint covers the bytes only, never the
    /// path, so a module hashes the same wherever it is stored.
    pub fn artifact_info(&self) -> ArtifactInfo {
        ArtifactInfo {
            path: self.source.clone(),
            size_bytes: self.bytes.len() as u64,
            hash: ArtifactHash {
                algorithm: DIGEST_ALGORITHM.to_string(),
                value: sha256_hex(&self.bytes),
            },
        }
    }
}
