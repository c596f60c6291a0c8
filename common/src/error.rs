//! Error type shared by every client-side module.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure (connection refused, DNS, CORS in the browser…).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.  `message` is the
    /// backend's own explanation when it sent one.
    #[error("{path} returned HTTP {status}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },

    #[error("cannot decode response: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Malformed Engine.IO / Socket.IO frame.
    #[error("socket protocol error: {0}")]
    Protocol(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown role {0:?}")]
    UnknownRole(String),

    #[error("unknown sensor {0:?}")]
    UnknownSensor(String),

    #[error("unknown time range {0:?}")]
    UnknownRange(String),

    /// An export was aborted because one of its series could not be fetched.
    #[error("export aborted: {0}")]
    Export(String),

    #[error("invalid input: {0}")]
    Invalid(String),
}

impl Error {
    /// Short text for inline banners: the backend message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            Error::Status { message, .. } if !message.is_empty() => message.clone(),
            Error::Http(_) => "Cannot reach the server. Check your connection.".into(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
