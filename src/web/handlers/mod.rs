pub mod admin;
pub mod auth;
pub mod creator;
pub mod files;
pub mod gallery;

use crate::models::Identity;
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::response::Html;
use tera::Context;

fn make_context(user: Option<&Identity>, flash: Option<String>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("is_admin", &user.map(Identity::is_moderator).unwrap_or(false));
    ctx.insert("flash", &flash);
    ctx.insert("version", env!("CARGO_PKG_VERSION"));
    ctx
}

fn render(state: &AppState, template: &str, ctx: &Context) -> AppResult<Html<String>> {
    let html = state.templates.render(template, ctx)?;
    Ok(Html(html))
}
