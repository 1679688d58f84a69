pub mod admin_secret;
pub mod init;
pub mod serve;
pub mod thumbs;
pub mod user;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gallerist")]
#[command(version)]
#[command(about = "A self-hosted video and image gallery", long_about = None)]
pub struct Cli {
    #[arg(short, long, env = "GALLERIST_CONFIG", default_value = "gallerist.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a config file and the media directory layout
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Set the shared secret that unlocks admin mode
    AdminSecret {
        #[arg(long)]
        password: Option<String>,
    },
    /// Generate missing thumbnails for every approved video
    Thumbs,
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "user")]
        role: String,
        #[arg(long)]
        password: Option<String>,
    },
    List,
    Remove {
        username: String,
    },
    Passwd {
        username: String,
    },
}

/// Reads a password twice from the terminal.
pub(crate) fn prompt_new_password(prompt: &str) -> anyhow::Result<String> {
    let password = rpassword::prompt_password(prompt)?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}
