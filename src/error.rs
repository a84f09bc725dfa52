use thiserror::Error;

/// Errors raised while driving a native media element.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The native element refused an operation (e.g. a position write before
    /// the stream exposes a valid timeline).
    #[error("media element rejected {operation}: {reason}")]
    Element {
        operation: &'static str,
        reason: String,
    },

    #[error("failed to create media element: {0}")]
    CreateElement(String),

    #[error("failed to attach media element to its container: {0}")]
    Attach(String),

    #[error("unknown native media event `{0}`")]
    UnknownEvent(String),
}

impl Error {
    pub fn element(operation: &'static str, reason: impl Into<String>) -> Self {
        Error::Element {
            operation,
            reason: reason.into(),
        }
    }
}
