use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::core::rate::FetchError;
use crate::core::record::StoreError;

/// Failures of the `/cotacao` endpoint and the status each one maps to.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to create request")]
    Request(#[source] FetchError),

    #[error("Failed to fetch exchange rate")]
    Upstream(#[source] FetchError),

    #[error("API request failed")]
    UpstreamStatus(u16),

    #[error("Failed to decode response")]
    Decode(#[source] FetchError),

    #[error("Failed to save exchange rate")]
    Store(#[from] StoreError),

    #[error("Failed to save exchange rate")]
    StoreTimeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Upstream(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Request(_)
            | ApiError::UpstreamStatus(_)
            | ApiError::Decode(_)
            | ApiError::Store(_)
            | ApiError::StoreTimeout => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Request(_) => ApiError::Request(err),
            FetchError::Transport(_) => ApiError::Upstream(err),
            FetchError::Status(status) => ApiError::UpstreamStatus(status),
            FetchError::Decode(_) | FetchError::MissingQuote(_) => ApiError::Decode(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
