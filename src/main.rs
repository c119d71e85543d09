use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use superheroes::{api, config::Config, db, seed};

#[derive(Parser)]
#[command(name = "superheroes")]
#[command(about = "Heroes, powers and the strengths that bind them")]
struct Cli {
    /// Database file. Overrides SUPERHEROES_DB.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API. Overrides SUPERHEROES_PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply pending schema migrations and exit
    Migrate,
    /// Replace all data with the sample heroes and powers
    Seed,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "superheroes=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<db::Database> {
    let path = config.db_path()?;
    tracing::debug!("Opening database at {}", path.display());

    let db = db::Database::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    db.migrate()?;
    Ok(db)
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let db = open_database(config)?;
    let app = api::create_router_with_cors(db, config.cors_layer());

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Superheroes API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env();
    if let Some(path) = cli.db {
        config.db_path = Some(path);
    }

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(&config).await?;
        }
        Some(Commands::Migrate) => {
            open_database(&config)?;
            tracing::info!("Database is up to date");
        }
        Some(Commands::Seed) => {
            let db = open_database(&config)?;
            let summary = seed::seed(&db)?;
            println!(
                "Seeded {} heroes, {} powers and {} hero powers",
                summary.heroes, summary.powers, summary.hero_powers
            );
        }
        None => serve(&config).await?,
    }

    Ok(())
}
