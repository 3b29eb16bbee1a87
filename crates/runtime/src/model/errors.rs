use thiserror::Error;

/// Errors from model endpoint calls.
///
/// These are the only failures that escape the orchestration loop; there is
/// no retry policy, the caller decides what to do.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// A network error occurred during the API call.
    #[error("network: {0}")]
    Network(String),

    /// The endpoint returned an error response.
    #[error("provider api: {0}")]
    Api(String),

    /// The endpoint response could not be parsed.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
