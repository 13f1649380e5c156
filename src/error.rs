use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const CHANNELS_ERROR_MESSAGE: &str = "Failed to fetch live streams";

/// Why an upstream fetch failed. Only ever logged, never sent to clients.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            None => FetchError::Request {
                url: url.to_string(),
                source: err,
            },
        }
    }
}

/// Errors returned from HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No URL provided")]
    MissingUrl,
    #[error("Failed to fetch live streams")]
    ChannelsUnavailable,
    #[error("Source unreachable")]
    SourceUnreachable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ChannelsUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": CHANNELS_ERROR_MESSAGE })),
            )
                .into_response(),
            ApiError::MissingUrl => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_string(),
            )
                .into_response(),
            ApiError::SourceUnreachable => (
                StatusCode::BAD_GATEWAY,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_string(),
            )
                .into_response(),
        }
    }
}
