use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ryb_ratings::campuses::{load_universities, seed_campuses};
use ryb_ratings::config::AppConfig;
use ryb_ratings::search::SearchQuery;
use ryb_ratings::{db, AppState};

#[derive(Parser)]
#[command(name = "ryb-ratings")]
#[command(about = "Maintenance commands for the lecturer and campus ratings store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Recompute stored rating averages and counts from the rating records
    Reconcile {
        #[arg(long, value_enum, default_value_t = Scope::All)]
        scope: Scope,
    },
    /// Create campuses from a universities JSON file
    SeedCampuses { path: PathBuf },
    /// Search lecturers and campuses by name
    Search {
        #[arg(long)]
        lecturer_name: Option<String>,
        #[arg(long)]
        campus_name: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scope {
    Lecturers,
    Campuses,
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid LOG_LEVEL filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database)
        .await
        .context("failed to connect to Postgres")?;

    // Run migrations on startup so every command sees the current schema
    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let state = AppState::postgres(pool, &config);

    match cli.command {
        Commands::Migrate => {
            println!("Schema ready.");
        }
        Commands::Reconcile { scope } => {
            if matches!(scope, Scope::Lecturers | Scope::All) {
                let report = state.reconcile_lecturers().await?;
                println!(
                    "Lecturers: {} refreshed, {} failed",
                    report.refreshed, report.failed
                );
            }
            if matches!(scope, Scope::Campuses | Scope::All) {
                let report = state.reconcile_campuses().await?;
                println!(
                    "Campuses: {} refreshed, {} failed",
                    report.refreshed, report.failed
                );
            }
        }
        Commands::SeedCampuses { path } => {
            let universities = load_universities(&path)?;
            let summary = seed_campuses(&state.campuses, &universities).await;

            println!("Total universities: {}", summary.total);
            println!("Successfully added: {}", summary.created);
            println!("Failed: {}", summary.failed);
        }
        Commands::Search {
            lecturer_name,
            campus_name,
        } => {
            let response = state
                .search
                .search(SearchQuery {
                    lecturer_name,
                    campus_name,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
