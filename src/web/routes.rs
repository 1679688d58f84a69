use super::handlers;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/login",
            get(handlers::auth::login_form).post(handlers::auth::login),
        )
        .route(
            "/admin/login",
            get(handlers::auth::admin_login_form).post(handlers::auth::admin_login),
        )
        .route("/logout", get(handlers::auth::logout))
}

pub fn gallery_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::gallery::home))
        .route("/home", get(handlers::gallery::home))
        .route("/gallery", get(handlers::gallery::gallery))
        .route("/video/:filename", get(handlers::files::stream_video))
        .route("/serve_image/:filename", get(handlers::files::serve_image))
        .route("/serve_thumb/:filename", get(handlers::files::serve_thumb))
}

pub fn creator_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new().route(
        "/creator/:plan",
        get(handlers::creator::upload_form)
            .post(handlers::creator::upload)
            .layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(handlers::admin::panel))
        .route("/admin/approve", post(handlers::admin::approve))
        .route("/admin/delete", post(handlers::admin::delete))
        .route("/admin/rename", post(handlers::admin::rename))
}
