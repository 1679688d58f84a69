use crate::services::store::MediaStore;
use crate::services::thumbnail::ThumbnailGenerator;
use crate::Config;
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let layout = config.layout();
    let store = MediaStore::new(layout.clone());
    store.ensure_layout()?;

    let generator = ThumbnailGenerator::from_config(&layout, &config.thumbnails);
    let videos: Vec<String> = store
        .approved_videos()?
        .into_iter()
        .map(|video| video.name)
        .collect();

    tracing::info!(
        videos = videos.len(),
        backend = generator.backend_name(),
        "Warming thumbnail cache"
    );
    let report = generator.warm(&videos).await;

    println!(
        "{} generated, {} already cached, {} failed",
        report.generated, report.cached, report.failed
    );
    if report.failed > 0 {
        anyhow::bail!("{} thumbnail(s) could not be generated", report.failed);
    }

    Ok(())
}
