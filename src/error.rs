use thiserror::Error;

/// Everything that can go wrong while issuing a tracked request.
///
/// The tracker flattens every variant into its `Display` text when it
/// records a failure, so transport and decode variants print the underlying
/// message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Fetch error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        FetchError::Status {
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
