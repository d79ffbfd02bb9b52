use crate::feed::LocalityTask;
use crate::scraper::extract::total_results;
use crate::scraper::fetcher::{PageFetcher, PageSource};
use crate::scraper::models::RawSale;
use crate::scraper::urls::{first_page_url, page_url};
use tracing::{info, warn};

/// The site always shows this many results per page.
pub const RESULTS_PER_PAGE: u32 = 12;

/// Upper bound on sales buffered for a single locality.
pub const MAX_RECORDS_PER_LOCALITY: usize = 5000;

pub const DEFAULT_MAX_PAGES: u32 = 200;

pub fn total_pages(total_results: u32) -> u32 {
    total_results.div_ceil(RESULTS_PER_PAGE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Reached the page count computed from the results hint.
    LastPage,
    /// A page came back with no listings.
    EmptyPage,
    /// A page could not be fetched or parsed.
    FetchFailed,
    PageLimit,
    RecordCap,
}

#[derive(Debug)]
pub struct LocalityScrape {
    pub sales: Vec<RawSale>,
    pub pages_fetched: u32,
    pub total_pages: Option<u32>,
    pub stop: StopReason,
}

/// Walks the result pages of one locality, in order, until they run out.
pub struct Paginator<'a, S: PageSource> {
    fetcher: &'a PageFetcher<S>,
    base_url: &'a str,
    max_pages: u32,
    max_records: usize,
}

impl<'a, S: PageSource> Paginator<'a, S> {
    pub fn new(fetcher: &'a PageFetcher<S>, base_url: &'a str) -> Self {
        Self {
            fetcher,
            base_url,
            max_pages: DEFAULT_MAX_PAGES,
            max_records: MAX_RECORDS_PER_LOCALITY,
        }
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records.max(1);
        self
    }

    pub fn scrape(&self, task: &LocalityTask) -> LocalityScrape {
        let mut out = LocalityScrape {
            sales: Vec::new(),
            pages_fetched: 0,
            total_pages: None,
            stop: StopReason::FetchFailed,
        };

        // ----- First page: also carries the results hint -----
        let first = match self
            .fetcher
            .fetch_page(&first_page_url(self.base_url, task), &task.locality)
        {
            Ok(page) => page,
            Err(e) => {
                warn!("Error scraping first page for {}: {e}", task.locality);
                return out;
            }
        };
        out.pages_fetched = 1;

        if let Some(total) = total_results(&first.document) {
            let pages = total_pages(total);
            info!("Found {total} total properties across {pages} pages");
            out.total_pages = Some(pages);
        }

        // An empty first page only ends the walk when no later page is promised.
        if first.sales.is_empty() {
            if out.total_pages.map_or(true, |total| total <= 1) {
                info!("No properties found on page 1, stopping.");
                out.stop = StopReason::EmptyPage;
                return out;
            }
            warn!("No properties read from page 1, continuing to page 2");
        } else {
            out.sales.extend(first.sales);
            if self.hit_record_cap(&mut out) {
                return out;
            }
        }

        // ----- Remaining pages -----
        let mut page = 1;
        loop {
            if let Some(total) = out.total_pages {
                if page >= total {
                    info!("Reached last page");
                    out.stop = StopReason::LastPage;
                    break;
                }
            }
            if page >= self.max_pages {
                warn!("Page limit of {} reached for {}", self.max_pages, task.locality);
                out.stop = StopReason::PageLimit;
                break;
            }

            self.fetcher.pacing().pause();
            page += 1;

            let of = out
                .total_pages
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            info!("Scraping page {page} of {of}...");

            let fetched = match self
                .fetcher
                .fetch_page(&page_url(self.base_url, task, page), &task.locality)
            {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Error scraping page {page} for {}: {e}", task.locality);
                    out.stop = StopReason::FetchFailed;
                    break;
                }
            };
            out.pages_fetched += 1;

            if fetched.sales.is_empty() {
                info!("No properties found on page {page}, stopping.");
                out.stop = StopReason::EmptyPage;
                break;
            }

            out.sales.extend(fetched.sales);
            info!("Total properties scraped so far: {}", out.sales.len());

            if self.hit_record_cap(&mut out) {
                break;
            }
        }

        out
    }

    fn hit_record_cap(&self, out: &mut LocalityScrape) -> bool {
        if out.sales.len() < self.max_records {
            return false;
        }
        warn!(
            "Record cap of {} reached, dropping {} extra",
            self.max_records,
            out.sales.len() - self.max_records
        );
        out.sales.truncate(self.max_records);
        out.stop = StopReason::RecordCap;
        true
    }
}
