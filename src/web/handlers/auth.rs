use super::{make_context, render};
use crate::services::session::SESSION_COOKIE;
use crate::web::error::AppResult;
use crate::web::extractors::{CurrentUser, OptionalUser};
use crate::web::flash;
use crate::web::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration;

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let lifetime = i64::try_from(state.sessions.lifetime().as_secs()).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(lifetime))
        .build()
}

pub async fn login_form(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let (jar, message) = flash::take(jar);
    let ctx = make_context(None, message);
    let html = render(&state, "login.html", &ctx)?;
    Ok((jar, html).into_response())
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let username = form.username.trim();
    let rate_key = format!("login:{}", username);
    if !state.rate_limiter.check(&rate_key) {
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts. Please wait before trying again.",
        )
            .into_response());
    }

    match state.credentials.authenticate(username, &form.password)? {
        Some(identity) => {
            state.rate_limiter.clear(&rate_key);
            let token = state.sessions.create(&identity.username, false);
            tracing::info!(user = %identity.username, role = %identity.role, "User logged in");
            let landing = if identity.is_moderator() { "/admin" } else { "/home" };
            Ok((jar.add(session_cookie(&state, token)), Redirect::to(landing)).into_response())
        }
        None => {
            state.rate_limiter.record_attempt(&rate_key);
            tracing::warn!(user = %username, "Failed login attempt");
            Ok(flash::redirect(jar, "Wrong username or password", "/login"))
        }
    }
}

pub async fn admin_login_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, message) = flash::take(jar);
    let ctx = make_context(Some(&user), message);
    let html = render(&state, "admin_login.html", &ctx)?;
    Ok((jar, html).into_response())
}

#[derive(Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    admin_password: String,
}

pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<AdminLoginForm>,
) -> AppResult<Response> {
    let rate_key = format!("admin:{}", user.username);
    if !state.rate_limiter.check(&rate_key) {
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            "Too many attempts. Please wait before trying again.",
        )
            .into_response());
    }

    if !state.credentials.verify_admin_secret(&form.admin_password)? {
        state.rate_limiter.record_attempt(&rate_key);
        tracing::warn!(user = %user.username, "Failed admin elevation");
        return Ok(flash::redirect(jar, "Invalid admin password.", "/admin/login"));
    }

    state.rate_limiter.clear(&rate_key);
    let token = jar
        .get(SESSION_COOKIE)
        .and_then(|c| state.sessions.elevate(c.value()))
        .unwrap_or_else(|| state.sessions.create(&user.username, true));
    tracing::info!(user = %user.username, "Admin mode enabled");

    let jar = jar.add(session_cookie(&state, token));
    Ok(flash::redirect(jar, "Admin mode enabled.", "/admin"))
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> AppResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build();

    Ok((jar.remove(cookie), Redirect::to("/login")).into_response())
}
