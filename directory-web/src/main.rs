use std::sync::Arc;

use clap::{Parser, Subcommand};
use directory_store::{
    Store,
    seed::{Fixture, seed_if_empty},
};
use directory_web::{Settings, app, render::JsonRenderer};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Restaurant directory web server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate, seed an empty store and serve HTTP (default)
    Serve,
    /// Migrate and seed an empty store, then exit
    Seed,
}

fn load_fixture(settings: &Settings) -> Result<Fixture, Box<dyn std::error::Error>> {
    let fixture = match &settings.seed_fixture {
        Some(path) => Fixture::from_path(path)?,
        None => Fixture::bundled()?,
    };
    Ok(fixture)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let store = Store::connect(
        &settings.database_url,
        settings.pool_size,
        settings.delete_policy,
    )?;
    let outcome = seed_if_empty(&store, &load_fixture(&settings)?).await?;
    info!(?outcome, "seed check done");

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Seed => Ok(()),
        Commands::Serve => {
            let app = app(
                store,
                Arc::new(JsonRenderer),
                settings.public_dir.as_deref(),
            );

            let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
            info!(
                delete_policy = %settings.delete_policy,
                "Restaurant directory listening on {}",
                listener.local_addr()?
            );

            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}
