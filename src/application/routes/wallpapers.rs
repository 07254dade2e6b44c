use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{error, info};

use crate::application::errors::ApiError;
use crate::application::state::AppState;
use crate::domain::CommunityName;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(default_wallpaper))
        .route("/favicon.ico", get(favicon))
        .route("/{community}", get(community_wallpaper))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn default_wallpaper(State(state): State<AppState>) -> Result<Response, ApiError> {
    serve_wallpaper(&state, CommunityName::default_community()).await
}

#[tracing::instrument(skip(state))]
pub(crate) async fn community_wallpaper(
    State(state): State<AppState>,
    Path(community): Path<String>,
) -> Result<Response, ApiError> {
    let community = CommunityName::parse(&community).map_err(|err| {
        info!(error = %err, "rejected request");
        ApiError::from(err)
    })?;

    serve_wallpaper(&state, community).await
}

pub(crate) async fn favicon() -> ApiError {
    ApiError::NotFound
}

async fn serve_wallpaper(state: &AppState, community: CommunityName) -> Result<Response, ApiError> {
    let service = &state.wallpaper_service;

    match service.render(&community).await {
        Ok(wallpaper) => {
            info!(
                %community,
                source = %wallpaper.source_url,
                bytes = wallpaper.jpeg.len(),
                "serving wallpaper"
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "image/jpeg"),
                    (header::CACHE_CONTROL, "no-store"),
                ],
                wallpaper.jpeg,
            )
                .into_response())
        }
        Err(err) => {
            error!(
                %community,
                error = %err,
                attempts = service.retry_policy().max_attempts(),
                "giving up on wallpaper"
            );
            Err(ApiError::from(err))
        }
    }
}
