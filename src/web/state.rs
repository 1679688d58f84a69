use crate::services::credentials::CredentialStore;
use crate::services::session::SessionStore;
use crate::services::store::MediaStore;
use crate::services::thumbnail::{select_extractor, FrameExtractor, ThumbnailGenerator};
use crate::web::security::RateLimiter;
use crate::Config;
use anyhow::Result;
use std::sync::Arc;
use tera::Tera;

pub struct AppState {
    pub config: Config,
    pub templates: Tera,
    pub store: MediaStore,
    pub thumbnails: ThumbnailGenerator,
    pub credentials: CredentialStore,
    pub sessions: SessionStore,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let extractor = select_extractor(&config.thumbnails);
        Self::with_extractor(config, extractor)
    }

    /// Same as [`AppState::new`] with an explicit thumbnail backend.
    pub fn with_extractor(config: Config, extractor: Arc<dyn FrameExtractor>) -> Result<Self> {
        let mut templates = Tera::default();
        templates.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html")),
            ("login.html", include_str!("../../templates/login.html")),
            ("admin_login.html", include_str!("../../templates/admin_login.html")),
            ("home.html", include_str!("../../templates/home.html")),
            ("gallery.html", include_str!("../../templates/gallery.html")),
            ("creator_upload.html", include_str!("../../templates/creator_upload.html")),
            ("admin.html", include_str!("../../templates/admin.html")),
        ])?;

        let layout = config.layout();
        let store = MediaStore::new(layout.clone());
        store.ensure_layout()?;

        let thumbnails = ThumbnailGenerator::new(&layout, &config.thumbnails, extractor);
        let credentials = CredentialStore::new(config.users_file(), config.admin_file());
        let sessions = SessionStore::new(config.session_lifetime()?);

        Ok(Self {
            config,
            templates,
            store,
            thumbnails,
            credentials,
            sessions,
            rate_limiter: Arc::new(RateLimiter::default()),
        })
    }
}
