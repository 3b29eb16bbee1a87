use thiserror::Error;

/// Errors raised by tool handlers.
///
/// Never surfaced as control flow: the dispatcher renders them into the
/// tool result text the model sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("found {0} matches; pass all=true or make `old` unique")]
    AmbiguousMatch(usize),
    #[error("command timed out after {0}s")]
    Timeout(u64),
    #[error("execution failed: {0}")]
    Execution(String),
}

impl ToolError {
    pub(crate) fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
