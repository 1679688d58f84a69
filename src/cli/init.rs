use crate::services::store::MediaLayout;
use anyhow::Result;
use std::path::PathBuf;

const CONFIG_TEMPLATE: &str = r#"[server]
host = "127.0.0.1"
port = 5000

[library]
root = "."

[auth]
users_file = "all-pass/login-pass.json"
admin_file = "all-pass/adminpass.json"
session_lifetime = "10h"

[uploads]
max_size = "1GB"

[thumbnails]
# auto, library, transcoder or disabled
backend = "auto"
ffmpeg_path = "ffmpeg"
timeout_secs = 30
seek_ms = 2000
width = 400
"#;

pub async fn run(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)?;

    let config_path = path.join("gallerist.toml");
    if config_path.exists() {
        anyhow::bail!("'{}' already exists", config_path.display());
    }

    MediaLayout::new(&path).ensure()?;
    std::fs::create_dir_all(path.join("all-pass"))?;
    std::fs::write(&config_path, CONFIG_TEMPLATE)?;

    tracing::info!("Created new gallery at {:?}", path);
    tracing::info!("Run 'gallerist user add --username <name> --role admin' to create an account");
    tracing::info!("Run 'gallerist serve' to start the server");

    Ok(())
}
