//! Accessors for the material under evaluation.
//!
//! Every accessor goes back to the host; nothing is cached between calls.

use serde::de::DeserializeOwned;

use crate::error::{SdkError, SdkResult};
use crate::host::Host;

pub fn material_bytes(host: &Host<'_>) -> SdkResult<Vec<u8>> {
    let bytes = host
        .input()
        .input()
        .map_err(SdkError::MaterialUnavailable)?;
    log::debug!("fetched material ({} bytes)", bytes.len());
    Ok(bytes)
}

pub fn material_string(host: &Host<'_>) -> SdkResult<String> {
    Ok(String::from_utf8(material_bytes(host)?)?)
}

pub fn material_json(host: &Host<'_>) -> SdkResult<serde_json::Value> {
    material_as(host)
}

/// Decodes the material straight into a typed document.
pub fn material_as<T: DeserializeOwned>(host: &Host<'_>) -> SdkResult<T> {
    let bytes = material_bytes(host)?;
    serde_json::from_slice(&bytes).map_err(SdkError::MaterialJson)
}
