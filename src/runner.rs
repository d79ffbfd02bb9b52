use crate::domain::normalize_batch;
use crate::feed::LocalityTask;
use crate::scraper::pager::{DEFAULT_MAX_PAGES, MAX_RECORDS_PER_LOCALITY};
use crate::scraper::{PageFetcher, PageSource, Pacing, Paginator};
use crate::store::{upload, SaleStore, UploadSummary, DEFAULT_BATCH_SIZE};
use chrono::Utc;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub base_url: String,
    pub batch_size: usize,
    pub max_pages: u32,
    pub max_records: usize,
    pub locality_pacing: Pacing,
}

impl RunOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            max_records: MAX_RECORDS_PER_LOCALITY,
            locality_pacing: Pacing::locality(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalityOutcome {
    Uploaded(UploadSummary),
    Empty,
    /// Records were found but no chunk made it into the store.
    Failed(UploadSummary),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub localities: usize,
    pub uploaded: usize,
    pub empty: usize,
    pub failed: usize,
    pub records_uploaded: usize,
    pub chunks_ok: usize,
    pub chunks_failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &LocalityOutcome) {
        self.localities += 1;
        match outcome {
            LocalityOutcome::Uploaded(up) => {
                self.uploaded += 1;
                self.chunks_ok += up.chunks_ok;
                self.chunks_failed += up.chunks_failed;
                self.records_uploaded += up.records_ok;
            }
            LocalityOutcome::Empty => self.empty += 1,
            LocalityOutcome::Failed(up) => {
                self.failed += 1;
                self.chunks_failed += up.chunks_failed;
            }
        }
    }
}

/// Scrape -> normalize -> upload, one locality at a time.
pub struct Runner<'a, S: PageSource> {
    fetcher: PageFetcher<S>,
    store: &'a dyn SaleStore,
    options: RunOptions,
}

impl<'a, S: PageSource> Runner<'a, S> {
    pub fn new(fetcher: PageFetcher<S>, store: &'a dyn SaleStore, options: RunOptions) -> Self {
        Self {
            fetcher,
            store,
            options,
        }
    }

    pub fn run(&self, tasks: &[LocalityTask]) -> RunSummary {
        let mut summary = RunSummary::default();
        let total = tasks.len();

        for (idx, task) in tasks.iter().enumerate() {
            info!(
                "Processing suburb {} of {total}: {} ({} {})",
                idx + 1,
                task.locality,
                task.region,
                task.postcode
            );

            let outcome = self.process_locality(task);
            summary.record(&outcome);

            self.options.locality_pacing.pause();
        }

        info!(
            "Run finished: {} localities ({} uploaded, {} empty, {} failed), {} records in {} chunks, {} chunks failed",
            summary.localities,
            summary.uploaded,
            summary.empty,
            summary.failed,
            summary.records_uploaded,
            summary.chunks_ok,
            summary.chunks_failed
        );
        summary
    }

    pub fn process_locality(&self, task: &LocalityTask) -> LocalityOutcome {
        let scrape = Paginator::new(&self.fetcher, &self.options.base_url)
            .max_pages(self.options.max_pages)
            .max_records(self.options.max_records)
            .scrape(task);

        let records = normalize_batch(scrape.sales, Utc::now().naive_utc());
        if records.is_empty() {
            warn!("No properties found in {}", task.locality);
            return LocalityOutcome::Empty;
        }

        let count = records.len();
        let up = upload(self.store, records, self.options.batch_size, &task.locality);

        if up.all_failed() {
            error!("Every upload batch failed for {}", task.locality);
            return LocalityOutcome::Failed(up);
        }

        let pages = match scrape.total_pages {
            Some(total) => format!("{} of {total}", scrape.pages_fetched),
            None => scrape.pages_fetched.to_string(),
        };
        info!(
            "Successfully processed {count} properties from {} ({}/{} uploaded, pages {pages}, stopped: {:?})",
            task.locality, up.records_ok, up.records, scrape.stop
        );
        LocalityOutcome::Uploaded(up)
    }
}
