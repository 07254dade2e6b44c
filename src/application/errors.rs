use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::WallpaperError;

/// What the client is told. Details stay in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    NotFound,
    Internal,
}

impl From<WallpaperError> for ApiError {
    fn from(err: WallpaperError) -> Self {
        match err {
            WallpaperError::InvalidRoute(_) => Self::NotFound,
            WallpaperError::UpstreamFetch { .. }
            | WallpaperError::EmptyFeed { .. }
            | WallpaperError::MissingImageUrl { .. }
            | WallpaperError::Transform { .. } => Self::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
