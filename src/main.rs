use clap::Parser;
use gallerist::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gallerist=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            gallerist::cli::init::run(path).await?;
        }
        Some(Commands::Serve { host, port }) => {
            gallerist::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::User { command }) => {
            gallerist::cli::user::run(&cli.config, command).await?;
        }
        Some(Commands::AdminSecret { password }) => {
            gallerist::cli::admin_secret::run(&cli.config, password).await?;
        }
        Some(Commands::Thumbs) => {
            gallerist::cli::thumbs::run(&cli.config).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
