//! Database initialization
//!
//! Creates the database on first run, applies the schema idempotently, and
//! syncs the admin-configured catalog (tiers and questions) into it.

use crate::config::CatalogFile;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Wait out short-lived write locks instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Schema creation (idempotent - safe to call multiple times)
    create_tiers_table(&pool).await?;
    create_questions_table(&pool).await?;
    create_events_table(&pool).await?;
    create_answers_table(&pool).await?;
    create_submissions_table(&pool).await?;

    Ok(pool)
}

async fn create_tiers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tiers (
            id TEXT PRIMARY KEY,
            weight INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            tier TEXT NOT NULL REFERENCES tiers(id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            tier TEXT,
            created_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_answers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            question TEXT NOT NULL,
            response INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            answer_ids TEXT NOT NULL,
            tier TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Sync the admin-configured catalog into the database.
///
/// Upserts every declared tier and question. Entries removed from the file
/// are also removed from the database, so the file is the single source of
/// truth for the catalog. Past answer/submission records are untouched.
pub async fn apply_catalog(pool: &SqlitePool, catalog: &CatalogFile) -> Result<()> {
    for tier in &catalog.tiers {
        sqlx::query(
            "INSERT INTO tiers (id, weight) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET weight = excluded.weight",
        )
        .bind(&tier.id)
        .bind(tier.weight)
        .execute(pool)
        .await?;
    }

    for question in &catalog.questions {
        sqlx::query(
            "INSERT INTO questions (id, label, tier) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET label = excluded.label, tier = excluded.tier",
        )
        .bind(&question.id)
        .bind(&question.label)
        .bind(&question.tier)
        .execute(pool)
        .await?;
    }

    // Drop catalog entries no longer present in the file.
    // Questions first so the tier foreign key never dangles.
    let question_ids: Vec<String> = catalog.questions.iter().map(|q| q.id.clone()).collect();
    prune_missing(pool, "questions", "id", &question_ids).await?;
    let tier_ids: Vec<String> = catalog.tiers.iter().map(|t| t.id.clone()).collect();
    prune_missing(pool, "tiers", "id", &tier_ids).await?;

    info!(
        tiers = catalog.tiers.len(),
        questions = catalog.questions.len(),
        "Applied classification catalog"
    );
    Ok(())
}

async fn prune_missing(
    pool: &SqlitePool,
    table: &str,
    key_column: &str,
    keep: &[String],
) -> Result<()> {
    if keep.is_empty() {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(pool)
            .await?;
        return Ok(());
    }
    let placeholders = vec!["?"; keep.len()].join(", ");
    let sql = format!(
        "DELETE FROM {} WHERE {} NOT IN ({})",
        table, key_column, placeholders
    );
    let mut query = sqlx::query(&sql);
    for id in keep {
        query = query.bind(id);
    }
    query.execute(pool).await?;
    Ok(())
}
