use crate::models::Identity;
use crate::services::session::SESSION_COOKIE;
use crate::web::error::AppError;
use crate::web::flash;
use crate::web::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Resolves the session cookie against the session store and the current credential file.
fn session_identity(state: &AppState, headers: &HeaderMap) -> anyhow::Result<Option<Identity>> {
    let cookies = CookieJar::from_headers(headers);
    let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return Ok(None);
    };
    let Some(session) = state.sessions.get(&token) else {
        return Ok(None);
    };

    match state.credentials.identity_for(&session.username)? {
        Some(identity) if session.elevated => Ok(Some(identity.elevated())),
        Some(identity) => Ok(Some(identity)),
        None => {
            // account removed from login-pass.json
            state.sessions.remove(&token);
            Ok(None)
        }
    }
}

pub struct CurrentUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let state = state.clone();
        let headers = parts.headers.clone();
        Box::pin(async move {
            match session_identity(&state, &headers) {
                Ok(Some(identity)) => Ok(CurrentUser(identity)),
                Ok(None) => Err(Redirect::to("/login").into_response()),
                Err(e) => Err(AppError::from(e).into_response()),
            }
        })
    }
}

/// An identity holding the moderation capability.
pub struct Moderator(pub Identity);

impl FromRequestParts<Arc<AppState>> for Moderator {
    type Rejection = Response;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let state = state.clone();
        let headers = parts.headers.clone();
        Box::pin(async move {
            match session_identity(&state, &headers) {
                Ok(Some(identity)) if identity.is_moderator() => Ok(Moderator(identity)),
                Ok(Some(_)) => Err(flash::redirect(
                    CookieJar::from_headers(&headers),
                    "Admin access required.",
                    "/admin/login",
                )),
                Ok(None) => Err(Redirect::to("/login").into_response()),
                Err(e) => Err(AppError::from(e).into_response()),
            }
        })
    }
}

pub struct OptionalUser(pub Option<Identity>);

impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = Response;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let state = state.clone();
        let headers = parts.headers.clone();
        Box::pin(async move {
            let user = session_identity(&state, &headers).ok().flatten();
            Ok(OptionalUser(user))
        })
    }
}
