//! evq-api - Event questionnaire submission service
//!
//! Accepts questionnaire submissions for events, validates them against the
//! admin-configured question catalog, derives the event's classification
//! tier, and records the answers.

use anyhow::Result;
use clap::Parser;
use evq_api::{build_router, AppState};
use evq_api::questionnaire::SubmissionService;
use evq_api::repo::{SqliteCatalog, SqliteEventStore, SqliteSubmissionStore};
use evq_common::config::{self, CatalogFile};
use evq_common::db::{apply_catalog, init_database};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "evq-api", about = "Event questionnaire submission service")]
struct Args {
    /// Root folder holding the database and catalog file
    #[arg(long)]
    root_folder: Option<String>,

    /// Classification catalog file (defaults to <root>/catalog.toml)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// HTTP listen port
    #[arg(long, env = "EVQ_PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!(
        "Starting Event Questionnaire service (evq-api) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), "EVQ_ROOT_FOLDER");
    std::fs::create_dir_all(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    // Catalog file is the source of truth for tiers and questions
    let catalog_path = args
        .catalog
        .unwrap_or_else(|| root_folder.join(config::CATALOG_FILE));
    if catalog_path.exists() {
        let catalog = CatalogFile::load(&catalog_path)?;
        apply_catalog(&pool, &catalog).await?;
    } else {
        warn!(
            "No catalog file at {}; serving with the catalog already in the database",
            catalog_path.display()
        );
    }

    let events = Arc::new(SqliteEventStore::new(pool.clone()));
    let catalog = Arc::new(SqliteCatalog::new(pool.clone()));
    let store = Arc::new(SqliteSubmissionStore::new(pool));
    let service = Arc::new(SubmissionService::new(
        events,
        catalog.clone(),
        catalog,
        store,
    ));

    let state = AppState::new(service);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("evq-api listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
