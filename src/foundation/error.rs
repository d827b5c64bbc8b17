/// Result alias used across the crate.
pub type FlowResult<T> = Result<T, FlowError>;

/// Error taxonomy for spec generation, rendering, encoding and publishing.
///
/// [`crate::PipelineResult::failed`] is the only place these are converted into data; every other
/// component returns them through [`FlowResult`].
#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// A required input was empty or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Completion service configuration is missing. Never retried.
    #[error("config error: {0}")]
    Config(String),

    /// The completion service returned text that is not JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// The completion service returned JSON of the wrong shape.
    #[error("schema error: {0}")]
    Schema(String),

    /// The completion call itself failed.
    #[error("service error: {0}")]
    Service(String),

    /// An encoder operation was called outside its valid state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Stream or disk failure during encoding or persistence.
    #[error("io error: {0}")]
    Io(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Build a [`FlowError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlowError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FlowError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`FlowError::Schema`].
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build a [`FlowError::Service`].
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`FlowError::InvalidState`].
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build a [`FlowError::Io`].
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Only transport-level service failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Service(_))
    }
}

impl From<std::io::Error> for FlowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
