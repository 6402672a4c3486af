//! Seed reference data (ingredients and tags) from JSON files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p loaddata -- ingredients fixtures/data/ingredients.json
//! cargo run -p loaddata -- --database-url postgres://localhost/foodgram tags fixtures/data/tags.json
//! ```
//!
//! Rows that already exist are skipped, so the command can be re-run safely.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use tracing::{info, warn};

use foodgram_api::error::ApiError;
use foodgram_api::infra::db::{DbIngredientRepository, DbTagRepository};
use foodgram_api::usecase::catalog::{
    CreateIngredientInput, CreateIngredientUseCase, CreateTagInput, CreateTagUseCase,
};

#[derive(Parser)]
#[command(about = "Load Foodgram reference data into the database")]
struct Args {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load `[{"name", "measurement_unit"}]` records
    Ingredients {
        #[arg(default_value = "fixtures/data/ingredients.json")]
        file: PathBuf,
    },
    /// Load `[{"name", "color"}]` records; slugs are derived from names
    Tags {
        #[arg(default_value = "fixtures/data/tags.json")]
        file: PathBuf,
    },
}

#[derive(Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

#[derive(Deserialize)]
struct TagRecord {
    name: String,
    color: String,
}

/// Outcome counters for one load run.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    inserted: usize,
    skipped: usize,
}

impl Summary {
    /// Count a duplicate as skipped; any other error aborts the run.
    fn record<T>(&mut self, result: Result<T, ApiError>, duplicate: fn(&ApiError) -> bool) -> Result<()> {
        match result {
            Ok(_) => self.inserted += 1,
            Err(e) if duplicate(&e) => self.skipped += 1,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

fn read_records<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

async fn load_ingredients(db: DatabaseConnection, path: &Path) -> Result<Summary> {
    let records: Vec<IngredientRecord> = read_records(path)?;
    let usecase = CreateIngredientUseCase {
        repo: DbIngredientRepository { db },
    };
    let mut summary = Summary::default();
    for record in records {
        let result = usecase
            .execute(CreateIngredientInput {
                name: record.name,
                measurement_unit: record.measurement_unit,
            })
            .await;
        summary.record(result, |e| matches!(e, ApiError::IngredientAlreadyExists))?;
    }
    Ok(summary)
}

async fn load_tags(db: DatabaseConnection, path: &Path) -> Result<Summary> {
    let records: Vec<TagRecord> = read_records(path)?;
    let usecase = CreateTagUseCase {
        repo: DbTagRepository { db },
    };
    let mut summary = Summary::default();
    for record in records {
        let name = record.name.clone();
        let result = usecase
            .execute(CreateTagInput {
                name: record.name,
                color: record.color,
            })
            .await;
        if matches!(result, Err(ApiError::TagAlreadyExists)) {
            warn!(%name, "tag name, color or slug already taken");
        }
        summary.record(result, |e| matches!(e, ApiError::TagAlreadyExists))?;
    }
    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    foodgram_core::tracing::init_tracing("loaddata");
    let args = Args::parse();

    let db = Database::connect(&args.database_url)
        .await
        .context("connect to database")?;

    let (kind, summary) = match &args.command {
        Command::Ingredients { file } => ("ingredients", load_ingredients(db, file).await?),
        Command::Tags { file } => ("tags", load_tags(db, file).await?),
    };
    info!(
        kind,
        inserted = summary.inserted,
        skipped = summary.skipped,
        "reference data loaded"
    );
    println!(
        "{kind}: {} inserted, {} already present",
        summary.inserted, summary.skipped
    );
    Ok(())
}
