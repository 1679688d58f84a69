use crate::models::UserRole;
use crate::services::{auth, credentials::CredentialStore};
use crate::Config;
use anyhow::Result;
use std::path::Path;

use super::{prompt_new_password, UserCommand};

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let store = CredentialStore::new(config.users_file(), config.admin_file());

    match command {
        UserCommand::Add {
            username,
            role,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_new_password("Password: ")?,
            };
            auth::validate_password(&password)?;

            let role: UserRole = role.parse().map_err(|_| anyhow::anyhow!("Invalid role"))?;
            store.upsert_user(&username, &password, role)?;
            tracing::info!("User '{}' saved with role {}", username, role);
        }
        UserCommand::List => {
            let users = store.users()?;

            println!("{:<24} {:<10}", "USERNAME", "ROLE");
            println!("{}", "-".repeat(34));
            for (username, user) in &users {
                println!("{:<24} {:<10}", username, user.role);
            }
        }
        UserCommand::Remove { username } => {
            if store.remove_user(&username)? {
                tracing::info!("User '{}' removed", username);
            } else {
                tracing::warn!("User '{}' not found", username);
            }
        }
        UserCommand::Passwd { username } => {
            let password = prompt_new_password("New password: ")?;
            auth::validate_password(&password)?;

            store.set_password(&username, &password)?;
            tracing::info!("Password updated for '{}'", username);
        }
    }

    Ok(())
}
