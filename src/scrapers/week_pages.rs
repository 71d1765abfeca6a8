//! Week-page crawler.
//!
//! Seasons have an unknown number of week pages. The crawler walks
//! week 1, 2, 3... until the origin answers not-found, either as a
//! hard 404 or as a success page carrying the soft-404 marker. One
//! not-found ends the season; there is no gap tolerance.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{extract_references, FetchOutcome, PageFetcher, PageScraper, ScrapeError};
use crate::models::{GameReference, YearBatchEntry};
use crate::storage::{keys, ObjectStore};

/// Week page URL template base.
pub const WEEK_URL_BASE: &str = "https://www.pro-football-reference.com/years";

/// Soft-404 marker: the origin serves this inside a 200 page for
/// weeks that do not exist.
pub const NOT_FOUND_MARKER: &str = "Page Not Found (404 error)";

fn week_url(year: i32, week: u32) -> String {
    format!("{}/{}/week_{}.htm", WEEK_URL_BASE, year, week)
}

/// One week summary page, bound to its season and week number.
pub struct WeekPage {
    fetcher: Arc<dyn PageFetcher>,
    pub year: i32,
    pub week: u32,
}

impl WeekPage {
    pub fn new(fetcher: Arc<dyn PageFetcher>, year: i32, week: u32) -> Self {
        Self {
            fetcher,
            year,
            week,
        }
    }
}

#[async_trait]
impl PageScraper for WeekPage {
    type Parsed = Vec<GameReference>;

    fn name(&self) -> &'static str {
        "week-pages"
    }

    fn page_url(&self) -> String {
        week_url(self.year, self.week)
    }

    /// Fetch the raw week page. Both a hard 404 and the soft-404
    /// marker surface as [`ScrapeError::PageNotFound`].
    async fn fetch_raw(&self) -> Result<String, ScrapeError> {
        let url = self.page_url();
        match self.fetcher.fetch(&url).await? {
            FetchOutcome::Page(html) if html.contains(NOT_FOUND_MARKER) => {
                info!(year = self.year, week = self.week, "soft 404 detected");
                Err(ScrapeError::PageNotFound(url))
            }
            FetchOutcome::Page(html) => Ok(html),
            FetchOutcome::NotFound => {
                info!(year = self.year, week = self.week, "HTTP 404");
                Err(ScrapeError::PageNotFound(url))
            }
        }
    }

    fn parse_page(&self, html: &str) -> Result<Self::Parsed, ScrapeError> {
        Ok(extract_references(html, self.year, self.week))
    }
}

/// One fetched week during a season crawl.
#[derive(Debug, Clone)]
pub struct WeekCrawlResult {
    pub week: u32,
    /// Length of the fetched page body.
    pub content_len: usize,
    /// Store key: written in live mode, proposed in dry-run mode.
    pub key: String,
    /// Store-write failure, when one occurred.
    pub error: Option<String>,
}

/// Ordered per-week results for one season's crawl.
#[derive(Debug, Clone)]
pub struct SeasonCrawl {
    pub year: i32,
    pub weeks: Vec<WeekCrawlResult>,
}

impl SeasonCrawl {
    /// Weeks fetched and stored without error.
    pub fn stored_weeks(&self) -> usize {
        self.weeks.iter().filter(|w| w.error.is_none()).count()
    }
}

/// Crawler that archives raw week pages under the unprocessed prefix.
pub struct WeekPageCrawler {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl WeekPageCrawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            prefix: prefix.into(),
        }
    }

    /// Bind a week page for this crawler's source.
    pub fn week_page(&self, year: i32, week: u32) -> WeekPage {
        WeekPage::new(self.fetcher.clone(), year, week)
    }

    /// Crawl one season from week 1 until not-found.
    ///
    /// Dry-run mode runs the identical fetch and stop logic but skips
    /// the store write, so both modes stop at the same week. A store
    /// failure is recorded on its week and the crawl continues;
    /// `max_weeks` lets callers cap the otherwise unbounded walk.
    pub async fn crawl_season(
        &self,
        year: i32,
        dry_run: bool,
        max_weeks: Option<u32>,
    ) -> Result<SeasonCrawl, ScrapeError> {
        let mut weeks = Vec::new();
        let mut week: u32 = 1;

        info!(year, dry_run, "starting week-page crawl");

        loop {
            if let Some(cap) = max_weeks {
                if week > cap {
                    info!(year, cap, "stopping at externally capped week");
                    break;
                }
            }

            let page = self.week_page(year, week);
            let html = match page.fetch_raw().await {
                Ok(html) => html,
                Err(ScrapeError::PageNotFound(_)) => {
                    info!(year, weeks_found = week - 1, "finished season crawl");
                    break;
                }
                Err(e) => return Err(e),
            };

            let key = keys::week_unprocessed_key(&self.prefix, year, week);
            let error = if dry_run {
                info!(year, week, bytes = html.len(), key, "dry run: would store");
                None
            } else {
                match self.store.put(&key, &html, "text/html").await {
                    Ok(()) => {
                        info!(year, week, bytes = html.len(), key, "stored week page");
                        None
                    }
                    Err(e) => {
                        error!(year, week, key, error = %e, "failed to store week page");
                        Some(e.to_string())
                    }
                }
            };

            weeks.push(WeekCrawlResult {
                week,
                content_len: html.len(),
                key,
                error,
            });
            week += 1;
        }

        Ok(SeasonCrawl { year, weeks })
    }

    /// Crawl a list of seasons in order. A failed season is recorded
    /// and does not stop the batch.
    pub async fn crawl_years(
        &self,
        years: &[i32],
        dry_run: bool,
        max_weeks: Option<u32>,
    ) -> Vec<YearBatchEntry<SeasonCrawl>> {
        let mut results = Vec::with_capacity(years.len());

        for &year in years {
            match self.crawl_season(year, dry_run, max_weeks).await {
                Ok(crawl) => {
                    info!(year, weeks = crawl.weeks.len(), "completed season crawl");
                    results.push(YearBatchEntry::ok(year, crawl));
                }
                Err(e) => {
                    error!(year, error = %e, "season crawl failed, continuing to next year");
                    results.push(YearBatchEntry::failed(year, e.to_string()));
                }
            }
        }

        results
    }
}
