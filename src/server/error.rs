//! Maps domain errors onto HTTP responses.
//!
//! Story errors are the client's fault (400). Image errors come from an
//! upstream service we depend on (502).

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::warn;

use crate::core::StoryError;
use crate::images::ImageError;

#[derive(Debug)]
pub enum ApiError {
    Story(StoryError),
    Image(ImageError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Story(_) => StatusCode::BAD_REQUEST,
            ApiError::Image(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Story(e) => write!(f, "{e}"),
            ApiError::Image(e) => write!(f, "image error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoryError> for ApiError {
    fn from(e: StoryError) -> Self {
        ApiError::Story(e)
    }
}

impl From<ImageError> for ApiError {
    fn from(e: ImageError) -> Self {
        ApiError::Image(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Request failed ({}): {}", status.as_u16(), self);
        (status, self.to_string()).into_response()
    }
}
