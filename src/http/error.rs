//! Normalized client errors.

use std::time::Duration;

/// Errors surfaced by [`super::ApiClient`].
///
/// Every variant is `Clone` so a single refresh outcome can be handed to all
/// requests waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The request exceeded the client timeout. Never triggers a refresh.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String, body: String },

    /// The access token expired and could not be renewed.
    #[error("session expired: {0}")]
    RefreshExhausted(#[from] RefreshError),

    /// The response body did not have the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// HTTP status of the failed response, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Like [`ApiError::status`], but also reports the status of a failed
    /// reissue behind [`ApiError::RefreshExhausted`].
    #[must_use]
    pub fn cause_status(&self) -> Option<u16> {
        match self {
            Self::RefreshExhausted(RefreshError::Reissue(inner)) => inner.cause_status(),
            other => other.status(),
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    #[must_use]
    pub fn is_refresh_exhausted(&self) -> bool {
        matches!(self, Self::RefreshExhausted(_))
    }
}

/// Why a token reissue could not produce a new access token.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("reissue failed: {0}")]
    Reissue(Box<ApiError>),
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
