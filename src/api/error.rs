use reqwest::StatusCode;
use thiserror::Error;

/// Broad category of a failed exchange, used to pick the message the
/// user sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend could not be reached or did not answer in time
    Transport,
    /// Non-2xx status or a body that could not be decoded
    Protocol,
    /// A decoded reply whose `status` is not the success sentinel
    Logical,
    Unrecognized,
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("could not connect to backend: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("backend did not respond in time: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("backend responded with status {0}")]
    Status(StatusCode),
    #[error("malformed response from backend: {0}")]
    Malformed(String),
    #[error("backend reported status {0:?}")]
    UnexpectedStatus(String),
    #[error("{0}")]
    Other(String),
}

impl ExchangeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExchangeError::Connect(_) | ExchangeError::Timeout(_) => FailureKind::Transport,
            ExchangeError::Status(_) | ExchangeError::Malformed(_) => FailureKind::Protocol,
            ExchangeError::UnexpectedStatus(_) => FailureKind::Logical,
            ExchangeError::Other(_) => FailureKind::Unrecognized,
        }
    }

    /// Human readable text shown in place of a reply when a turn fails.
    pub fn diagnostic(&self) -> String {
        match self {
            ExchangeError::Connect(_) => String::from(
                "Sorry, I couldn't connect to the booking service. \
                 Please make sure the backend is running and try again.",
            ),
            ExchangeError::Timeout(_) => String::from(
                "Sorry, the booking service took too long to respond. \
                 Please make sure the backend is running and try again.",
            ),
            ExchangeError::Status(_) | ExchangeError::Malformed(_) => String::from(
                "Sorry, the booking service is experiencing issues right now. \
                 Please try again in a moment.",
            ),
            ExchangeError::UnexpectedStatus(_) => String::from(
                "Sorry, the booking service returned an unexpected status. Please try again.",
            ),
            ExchangeError::Other(raw) => format!("Sorry, something went wrong: {}", raw),
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err)
        } else if err.is_connect() {
            ExchangeError::Connect(err)
        } else if let Some(status) = err.status() {
            ExchangeError::Status(status)
        } else if err.is_decode() {
            ExchangeError::Malformed(err.to_string())
        } else {
            ExchangeError::Other(err.to_string())
        }
    }
}
