use crate::errors::AppError;
use crate::scraper::pager::DEFAULT_MAX_PAGES;
use crate::store::DEFAULT_BATCH_SIZE;
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_SITE: &str = "https://www.getsoldprice.com.au";
pub const DEFAULT_TABLE: &str = "nsw_property_sales";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Supabase / PostgREST table
    Rest,
    /// Local SQLite file
    Sqlite,
}

#[derive(Debug, Parser)]
#[command(name = "sold_scraper", about = "Scrape sold-property prices per suburb and upsert them")]
pub struct Cli {
    /// CSV with `suburb` and `postcode` columns (optional `state`)
    #[arg(short, long)]
    pub feed: PathBuf,

    /// Region code used when the feed has no `state` column
    #[arg(long, default_value = "NSW")]
    pub state: String,

    #[arg(long, default_value_t = 2024)]
    pub year_min: i32,

    #[arg(long, default_value_t = 2024)]
    pub year_max: i32,

    #[arg(long, value_enum, default_value_t = StoreKind::Rest)]
    pub store: StoreKind,

    /// SQLite path for `--store sqlite`
    #[arg(long, default_value = "sales.sqlite3")]
    pub db: String,

    #[arg(long, default_value = DEFAULT_SITE)]
    pub base_url: String,

    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Hard stop on pages fetched per suburb
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Skip all pacing delays
    #[arg(long)]
    pub no_delay: bool,
}

/// Remote store settings, from the environment (or `.env`).
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub project_url: Url,
    pub api_key: String,
    pub table: String,
}

impl RestConfig {
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (development)
        let _ = dotenv();

        let raw_url = env::var("SUPABASE_URL")
            .map_err(|_| AppError::Config("SUPABASE_URL must be set".into()))?;
        let project_url = Url::parse(&raw_url)
            .map_err(|e| AppError::Config(format!("SUPABASE_URL is not a valid URL: {e}")))?;

        Ok(Self {
            project_url,
            api_key: env::var("SUPABASE_KEY")
                .map_err(|_| AppError::Config("SUPABASE_KEY must be set".into()))?,
            table: env::var("SALES_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
        })
    }
}

impl Cli {
    pub fn validate(&self) -> Result<(), AppError> {
        Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("--base-url is not a valid URL: {e}")))?;

        if self.year_min > self.year_max {
            return Err(AppError::Config(format!(
                "--year-min {} is after --year-max {}",
                self.year_min, self.year_max
            )));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config("--batch-size must be at least 1".into()));
        }
        Ok(())
    }
}
