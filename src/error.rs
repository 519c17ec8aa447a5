use std::io;

/// Errors surfaced by a search invocation.
///
/// Cancellation is not an error; a cancelled search simply stops emitting events.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid settings: {reason}")]
    InvalidSettings { reason: String },

    #[error("word list could not be read: {0}")]
    Io(#[from] io::Error),

    #[error("search aborted: {message}")]
    Panicked { message: String },
}

impl SearchError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SearchError::InvalidSettings {
            reason: reason.into(),
        }
    }
}
