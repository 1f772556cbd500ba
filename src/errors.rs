use thiserror::Error;

/// Failures from any of the third-party APIs the handlers talk to.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0} API key not configured")]
    MissingKey(&'static str),
}
