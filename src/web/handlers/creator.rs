use super::{make_context, render};
use crate::models::Capability;
use crate::services::store::StoreError;
use crate::web::error::AppResult;
use crate::web::extractors::CurrentUser;
use crate::web::flash;
use crate::web::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

const UPLOAD_FIELD: &str = "media_file";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Paid,
}

impl Plan {
    fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }

    fn url(self) -> String {
        format!("/creator/{}", self.as_str())
    }
}

pub async fn upload_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(plan): Path<Plan>,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, message) = flash::take(jar);
    let mut ctx = make_context(Some(&user), message);
    ctx.insert("plan_name", plan.as_str());

    let html = render(&state, "creator_upload.html", &ctx)?;
    Ok((jar, html).into_response())
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(plan): Path<Plan>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> AppResult<Response> {
    if !user.can(Capability::Upload) {
        return Ok((StatusCode::FORBIDDEN, "Upload access required").into_response());
    }

    let back = plan.url();
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        if original_name.trim().is_empty() {
            break;
        }

        let upload = match state.store.begin_upload(&original_name) {
            Ok(upload) => upload,
            Err(StoreError::InvalidName(_)) | Err(StoreError::InvalidPath(_)) => {
                return Ok(flash::redirect(jar, "File type not allowed.", &back));
            }
            Err(StoreError::AlreadyExists(_)) => {
                return Ok(flash::redirect(jar, "File already exists in pending.", &back));
            }
            Err(e) => return Err(e.into()),
        };

        let mut file = tokio::fs::File::create(upload.temp_path()).await?;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.sync_all().await?;
        drop(file);

        return match upload.commit() {
            Ok(saved) => {
                tracing::info!(user = %user.username, plan = plan.as_str(), file = %saved.name, "Creator upload received");
                let message = format!(
                    "Upload successful ({} creator). Awaiting admin approval.",
                    plan.as_str()
                );
                Ok(flash::redirect(jar, &message, &back))
            }
            Err(StoreError::AlreadyExists(_)) => {
                Ok(flash::redirect(jar, "File already exists in pending.", &back))
            }
            Err(e) => Err(e.into()),
        };
    }

    Ok(flash::redirect(jar, "Please choose a file.", &back))
}
