use super::{make_context, render};
use crate::models::Location;
use crate::services::store::StoreError;
use crate::web::error::AppResult;
use crate::web::extractors::Moderator;
use crate::web::flash;
use crate::web::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

const PANEL: &str = "/admin";

pub async fn panel(
    State(state): State<Arc<AppState>>,
    Moderator(user): Moderator,
    jar: CookieJar,
) -> AppResult<Response> {
    let pending_files = state.store.pending_names()?;
    let approved_files = state.store.approved_names()?;

    let (jar, message) = flash::take(jar);
    let mut ctx = make_context(Some(&user), message);
    ctx.insert("pending_files", &pending_files);
    ctx.insert("approved_files", &approved_files);
    ctx.insert("thumbnail_backend", state.thumbnails.backend_name());

    let html = render(&state, "admin.html", &ctx)?;
    Ok((jar, html).into_response())
}

#[derive(Deserialize)]
pub struct ApproveForm {
    #[serde(default)]
    filename: String,
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Moderator(user): Moderator,
    jar: CookieJar,
    Form(form): Form<ApproveForm>,
) -> AppResult<Response> {
    match state.store.approve(&form.filename) {
        Ok(media) => {
            tracing::info!(admin = %user.username, file = %media.name, "Approved by moderator");
            Ok(flash::redirect(jar, "Media approved.", PANEL))
        }
        Err(StoreError::AlreadyExists(name)) => {
            let message = format!("A published file named {} already exists.", name);
            Ok(flash::redirect(jar, &message, PANEL))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    filename: String,
    location: Option<String>,
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Moderator(user): Moderator,
    jar: CookieJar,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    let location = Location::from_form(form.location.as_deref());
    state.store.delete(&form.filename, location)?;
    tracing::info!(admin = %user.username, file = %form.filename, %location, "Deleted by moderator");
    Ok(flash::redirect(jar, "File deleted.", PANEL))
}

#[derive(Deserialize)]
pub struct RenameForm {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    new_name: String,
    location: Option<String>,
}

pub async fn rename(
    State(state): State<Arc<AppState>>,
    Moderator(user): Moderator,
    jar: CookieJar,
    Form(form): Form<RenameForm>,
) -> AppResult<Response> {
    let location = Location::from_form(form.location.as_deref());
    match state.store.rename(&form.filename, &form.new_name, location) {
        Ok(new_name) => {
            tracing::info!(admin = %user.username, from = %form.filename, to = %new_name, "Renamed by moderator");
            Ok(flash::redirect(jar, "File renamed.", PANEL))
        }
        Err(StoreError::InvalidName(_)) => Ok(flash::redirect(jar, "Invalid new name.", PANEL)),
        Err(StoreError::AlreadyExists(_)) => Ok(flash::redirect(jar, "File already exists.", PANEL)),
        Err(e) => Err(e.into()),
    }
}
