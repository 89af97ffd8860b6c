use thiserror::Error;

/// Why a vendor call produced no usable data.
///
/// Callers above the client only ever branch on `Ok`/`Err`; the variants
/// exist for logs and tests.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("transport: {0}")]
    Transport(reqwest::Error),
    #[error("vendor returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response has no `bustime-response` envelope")]
    MissingEnvelope,
    #[error("envelope has no `{0}` field")]
    MissingField(&'static str),
    #[error("route {0} has no directions")]
    NoDirections(String),
}

/// The request URL carries the API key, so it is stripped before the error
/// can reach a log line or a response body.
impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e.without_url())
    }
}
