//! Content digests in the `<algorithm>:<hex>` form used by discovery.

use sha2::{Digest, Sha256};

pub const DIGEST_ALGORITHM: &str = "sha256";

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// `sha256:<hex>` digest of a material, suitable for `discover`.
pub fn material_digest(bytes: &[u8]) -> String {
    format!("{DIGEST_ALGORITHM}:{}", sha256_hex(bytes))
}
