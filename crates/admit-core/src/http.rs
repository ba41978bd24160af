//! HTTP calls routed through the host.
//!
//! One attempt per call. Timeouts and allow-listing belong to the host.

use serde::de::DeserializeOwned;

use crate::error::{SdkError, SdkResult};
use crate::host::{Host, HttpRequest, HttpResponse};

pub fn http_get(host: &Host<'_>, url: &str) -> SdkResult<HttpResponse> {
    send(host, HttpRequest::get(url))
}

pub fn http_post(host: &Host<'_>, url: &str, body: &str) -> SdkResult<HttpResponse> {
    send(host, HttpRequest::post(url, body))
}

pub fn http_get_json(host: &Host<'_>, url: &str) -> SdkResult<serde_json::Value> {
    http_get_as(host, url)
}

pub fn http_post_json(host: &Host<'_>, url: &str, body: &str) -> SdkResult<serde_json::Value> {
    decode_ok(url, http_post(host, url, body)?)
}

/// GETs `url` and decodes a 200 response body into `T`.
pub fn http_get_as<T: DeserializeOwned>(host: &Host<'_>, url: &str) -> SdkResult<T> {
    decode_ok(url, http_get(host, url)?)
}

fn send(host: &Host<'_>, request: HttpRequest) -> SdkResult<HttpResponse> {
    log::debug!("{} {}", request.method, request.url);
    host.http()
        .request(&request)
        .map_err(|err| SdkError::HttpTransport {
            url: request.url.clone(),
            message: err.message,
        })
}

// The body is only parsed after the status check passes.
fn decode_ok<T: DeserializeOwned>(url: &str, response: HttpResponse) -> SdkResult<T> {
    if response.status != 200 {
        return Err(SdkError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    serde_json::from_str(&response.body).map_err(|source| SdkError::HttpJson {
        url: url.to_string(),
        source,
    })
}
