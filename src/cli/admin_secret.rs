use crate::services::{auth, credentials::CredentialStore};
use crate::Config;
use anyhow::Result;
use std::path::Path;

use super::prompt_new_password;

pub async fn run(config_path: &Path, password: Option<String>) -> Result<()> {
    let config = Config::load(config_path)?;
    let store = CredentialStore::new(config.users_file(), config.admin_file());

    let password = match password {
        Some(p) => p,
        None => prompt_new_password("Admin secret: ")?,
    };
    auth::validate_password(&password)?;

    store.set_admin_secret(&password)?;
    tracing::info!("Admin secret written to {}", config.admin_file().display());

    Ok(())
}
