mod error;
mod extractors;
mod flash;
mod handlers;
mod routes;
pub mod security;
mod state;

pub use state::AppState;

use crate::Config;
use anyhow::Result;
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Builds the full application router over shared state.
pub fn router(state: Arc<AppState>) -> Result<Router> {
    let max_upload = state.config.max_upload_bytes()?;

    let app = Router::new()
        .merge(routes::auth_routes())
        .merge(routes::gallery_routes())
        .merge(routes::creator_routes(max_upload))
        .merge(routes::admin_routes())
        .layer(middleware::from_fn(security::apply_security_headers))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

pub async fn serve(config: Config, addr: &str) -> Result<()> {
    let state = Arc::new(AppState::new(config)?);
    tracing::info!(
        root = %state.config.library.root.display(),
        thumbnails = state.thumbnails.backend_name(),
        "Media library ready"
    );

    let janitor = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let expired = janitor.sessions.cleanup();
            if expired > 0 {
                tracing::debug!(expired, "Removed expired sessions");
            }
            janitor.rate_limiter.cleanup();
        }
    });

    let app = router(state)?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
