use thiserror::Error;

/// Failure reported by a host primitive across the execution boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the SDK wrappers.
///
/// These cover malformed input and failed host calls. Policy findings are
/// never errors; they accumulate as violations on a `PolicyResult`.
///
/// Messages never repeat their source; render with `{:#}` through
/// `anyhow` to see the whole chain.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("failed to read material")]
    MaterialUnavailable(#[source] HostError),

    #[error("material is not valid UTF-8")]
    MaterialUtf8(#[from] std::string::FromUtf8Error),

    #[error("failed to parse material as JSON")]
    MaterialJson(#[source] serde_json::Error),

    #[error("failed to parse policy arguments")]
    ArgsJson(#[source] serde_json::Error),

    #[error("policy arguments must be a JSON object, got {0}")]
    ArgsNotObject(&'static str),

    #[error("HTTP request to {url} failed: {message}")]
    HttpTransport { url: String, message: String },

    #[error("HTTP request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to parse JSON response from {url}")]
    HttpJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "discover call for {digest} failed: host returned no result \
         (check the discovery backend configuration and connectivity)"
    )]
    DiscoverUnavailable { digest: String },

    #[error("discover call for {digest} returned unreadable memory handle {handle}")]
    DiscoverMemory { digest: String, handle: u64 },

    #[error("failed to parse discover response for {digest}")]
    DiscoverJson {
        digest: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize policy result")]
    Output(#[source] serde_json::Error),
}

pub type SdkResult<T> = std::result::Result<T, SdkError>;
