use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("cannot build request URL from {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether a status poll that failed this way is worth repeating.
    ///
    /// Network errors, unreadable bodies, 404 (the job may not be visible
    /// yet), 408, 425, 429 and any 5xx are transient. Every other non-2xx
    /// status (bad request, auth failures, gone) is fatal.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) | ApiError::Decode(_) => true,
            ApiError::Status { status, .. } => is_transient_status(*status),
            ApiError::InvalidUrl(_) => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::Decode(_) | ApiError::InvalidUrl(_) => None,
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 404 | 408 | 425 | 429) || status.is_server_error()
}
