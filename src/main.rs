use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedline::app::AppContext;
use feedline::cli::{commands, Cli, Commands};
use feedline::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(path) = cli.database {
        config.database.path = Some(path);
    }
    if let Some(workers) = cli.workers {
        config.fetch.workers = workers;
    }

    let ctx = AppContext::new(config)?;
    let user = cli.user;

    match cli.command {
        Commands::Add { name, url } => {
            commands::add_source(&ctx, user, &name, &url)?;
        }
        Commands::Remove { id } => {
            commands::remove_source(&ctx, user, id)?;
        }
        Commands::Rename { id, name, url } => {
            commands::rename_source(&ctx, user, id, &name, &url)?;
        }
        Commands::Sources => {
            commands::list_sources(&ctx, user)?;
        }
        Commands::Import { path } => {
            commands::import_sources(&ctx, user, &path)?;
        }
        Commands::Export => {
            commands::export_sources(&ctx, user)?;
        }
        Commands::Refresh => {
            commands::refresh(&ctx, user).await?;
        }
        Commands::Page { offset, no_refresh } => {
            commands::show_page(&ctx, user, offset, !no_refresh).await?;
        }
    }

    Ok(())
}
