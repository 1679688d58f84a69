use crate::web::error::AppResult;
use crate::web::extractors::CurrentUser;
use crate::web::state::AppState;
use axum::extract::{Path, Request, State};
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// `ServeFile` answers `Range` requests with 206 and sets the content type from the extension.
async fn send_file(path: PathBuf, request: Request) -> AppResult<Response> {
    let response = ServeFile::new(path).oneshot(request).await?;
    Ok(response.into_response())
}

pub async fn stream_video(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(filename): Path<String>,
    request: Request,
) -> AppResult<Response> {
    let path = state.store.video_path(&filename)?;
    send_file(path, request).await
}

/// Approved images for everyone; pending images only for moderators.
pub async fn serve_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(filename): Path<String>,
    request: Request,
) -> AppResult<Response> {
    let path = state.store.image_path(&filename, user.is_moderator())?;
    send_file(path, request).await
}

pub async fn serve_thumb(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(filename): Path<String>,
    request: Request,
) -> AppResult<Response> {
    let path = state.store.thumbnail_path(&filename)?;
    send_file(path, request).await
}
