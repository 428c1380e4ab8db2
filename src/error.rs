use reqwest::{Method, StatusCode};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum CentralError {
    /// The configured base URL could not be used to address the service.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code returned by the service.
    #[error("{service} responded {status} to {method} {url}")]
    Http {
        /// Label of the upstream service, used to group diagnostics.
        service: &'static str,
        status: u16,
        method: Method,
        url: String,
    },
}

impl CentralError {
    /// HTTP status carried by a protocol error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => StatusCode::from_u16(*status).ok(),
            Self::Transport(err) => err.status(),
            Self::InvalidBaseUrl(_) => None,
        }
    }

    /// Returns `true` when this is a protocol error with the given status.
    pub fn is_status(&self, status: StatusCode) -> bool {
        matches!(self, Self::Http { status: actual, .. } if *actual == status.as_u16())
    }
}
