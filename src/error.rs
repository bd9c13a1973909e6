use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{ErrorCode, ErrorResponse, json_response};

/// Failure talking to the counter store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store returned unexpected status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("forbidden")]
    Forbidden,

    #[error("rate limited")]
    RateLimited,

    #[error("no counter store configured")]
    StoreUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Forbidden => ErrorCode::Forbidden,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::StoreUnavailable | Self::Store(_) => ErrorCode::ServerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::StoreUnavailable | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Forbidden | Self::RateLimited => {
                tracing::debug!(reason = %self, "visit rejected");
            }
            Self::StoreUnavailable => {
                tracing::error!("counter store binding missing");
            }
            Self::Store(err) => {
                tracing::error!(error = %err, "counter store error");
            }
        }

        json_response(self.status(), &ErrorResponse { error: self.code() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_mapping() {
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::StoreUnavailable.code(), ErrorCode::ServerError);

        let err = ApiError::from(StoreError::Status(503));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::ServerError);
    }
}
