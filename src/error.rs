//! Errors returned by this crate

use reqwest::StatusCode;

/// Everything that can go wrong when talking to the task API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request was rejected client-side, before anything was sent
    #[error("invalid input: {0}")]
    Validation(String),

    /// The server replied `401 Unauthorized`
    #[error("unauthorized{}", fmt_message(.message))]
    Unauthorized { message: Option<String> },

    /// A token refresh failed. Stored credentials have been cleared and the user must log in again
    #[error("session ended: {0}")]
    SessionEnded(#[source] Box<Error>),

    /// The server replied with any other non-success status
    #[error("unexpected HTTP status {status}{}", fmt_message(.message))]
    Status { status: StatusCode, message: Option<String> },

    /// No task with this ID is known
    #[error("no task with ID {0}")]
    NotFound(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unable to decode server data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(" ({})", m),
        None => String::new(),
    }
}

impl Error {
    /// Build an error from a non-success HTTP status and the (possibly empty) body of the reply
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_server_message(body);
        if status == StatusCode::UNAUTHORIZED {
            Error::Unauthorized { message }
        } else {
            Error::Status { status, message }
        }
    }

    /// The message the server sent along with an error, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Unauthorized { message } => message.as_deref(),
            Error::Status { message, .. } => message.as_deref(),
            Error::SessionEnded(inner) => inner.server_message(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    /// Whether this error means the user has to log in again
    pub fn is_session_ended(&self) -> bool {
        matches!(self, Error::SessionEnded(_))
    }
}

/// Error replies are JSON objects such as `{"message": "Invalid credentials", ...}`
fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("message")
        .and_then(|m| m.as_str())
        .filter(|m| m.is_empty() == false)
        .map(|m| m.to_string())
}
