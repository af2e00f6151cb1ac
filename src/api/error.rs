use std::fmt;

/// Errors that can occur while talking to the study backend.
///
/// Every variant is caught where the request was issued and turned into a
/// banner or an apology message. Nothing here is fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never completed: network failure, timeout, unreadable local
    /// file, or a body that is not the JSON shape the endpoint promises.
    Transport(String),
    /// The request completed but the response body reports a failure.
    Backend(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// The message carried by either variant, without the prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport(msg) | ApiError::Backend(msg) => msg,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}
