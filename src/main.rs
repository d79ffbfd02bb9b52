use crate::config::{Cli, RestConfig, StoreKind};
use crate::db::sales::count_sales;
use crate::db::{init_db, Database, SqliteStore};
use crate::errors::AppError;
use crate::feed::{read_feed, FeedDefaults};
use crate::runner::{RunOptions, Runner};
use crate::scraper::{HttpPageSource, PageFetcher, Pacing};
use crate::store::{RestStore, SaleStore};
use clap::Parser;
use tracing::{info, warn};

mod config;
mod db;
mod domain;
mod errors;
mod feed;
mod runner;
mod scraper;
mod store;


fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    // 1️⃣ Localities to walk
    let tasks = read_feed(
        &cli.feed,
        FeedDefaults {
            region: &cli.state,
            year_min: cli.year_min,
            year_max: cli.year_max,
        },
    )?;
    if tasks.is_empty() {
        warn!("Feed {} has no usable rows, nothing to do", cli.feed.display());
        return Ok(());
    }
    info!("Loaded {} localities from {}", tasks.len(), cli.feed.display());

    // 2️⃣ Destination
    let sqlite = match cli.store {
        StoreKind::Sqlite => {
            let db = Database::new(cli.db.clone());
            init_db(&db).map_err(|e| AppError::Db(e.to_string()))?;
            Some(db)
        }
        StoreKind::Rest => None,
    };
    let store: Box<dyn SaleStore> = match &sqlite {
        Some(db) => Box::new(SqliteStore::new(db.clone())),
        None => {
            let rest = RestConfig::from_env()?;
            info!("Uploading to table {} at {}", rest.table, rest.project_url);
            Box::new(
                RestStore::new(&rest.project_url, rest.api_key, &rest.table)
                    .map_err(|e| AppError::Config(e.to_string()))?,
            )
        }
    };

    // 3️⃣ Run
    let (request_pacing, locality_pacing) = if cli.no_delay {
        (Pacing::none(), Pacing::none())
    } else {
        (Pacing::request(), Pacing::locality())
    };

    let fetcher = PageFetcher::new(HttpPageSource::new(&cli.base_url), request_pacing);
    let options = RunOptions {
        batch_size: cli.batch_size,
        max_pages: cli.max_pages,
        locality_pacing,
        ..RunOptions::new(cli.base_url.clone())
    };

    let summary = Runner::new(fetcher, store.as_ref(), options).run(&tasks);

    if let Some(database) = &sqlite {
        match count_sales(database) {
            Ok(n) => info!("{} now holds {n} sales", database.path()),
            Err(e) => warn!("Could not count stored sales: {e}"),
        }
    }

    if summary.failed > 0 {
        warn!("{} localities could not be uploaded", summary.failed);
    }
    Ok(())
}
