use super::{make_context, render};
use crate::models::{ImageCard, VideoCard};
use crate::services::store::{thumbnail_name, title_for};
use crate::web::error::AppResult;
use crate::web::extractors::CurrentUser;
use crate::web::flash;
use crate::web::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

pub async fn home(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let videos = state.store.approved_videos()?;

    let mut cards = Vec::with_capacity(videos.len());
    for video in videos {
        // inline with the render; each call is a no-op once the thumbnail exists
        state.thumbnails.ensure_thumbnail(&video.name).await;
        cards.push(VideoCard {
            title: title_for(&video.name),
            thumb: thumbnail_name(&video.name),
            name: video.name,
        });
    }

    let (jar, message) = flash::take(jar);
    let mut ctx = make_context(Some(&user), message);
    ctx.insert("videos", &cards);

    let html = render(&state, "home.html", &ctx)?;
    Ok((jar, html).into_response())
}

pub async fn gallery(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let images: Vec<ImageCard> = state
        .store
        .approved_images()?
        .into_iter()
        .map(|image| ImageCard {
            title: title_for(&image.name),
            name: image.name,
        })
        .collect();

    let (jar, message) = flash::take(jar);
    let mut ctx = make_context(Some(&user), message);
    ctx.insert("images", &images);

    let html = render(&state, "gallery.html", &ctx)?;
    Ok((jar, html).into_response())
}
