//! Scrapers for betting-lines sources.
//!
//! Each source is an independent type implementing [`PageScraper`]:
//! fetch one page's raw content, parse it into a typed result. The
//! orchestration layers compose these instead of inheriting from a
//! shared base.

mod game_references;
mod historical_lines;
mod http_client;
mod live_odds;
mod week_pages;

pub use game_references::{extract_references, references_to_csv};
pub use historical_lines::{
    classify_and_map, extract_season, to_csv, HistoricalLinesScraper, RowCell, SeasonPage,
    SeasonUpload,
};
pub use http_client::HttpClient;
pub use live_odds::LiveOddsScraper;
pub use week_pages::{SeasonCrawl, WeekCrawlResult, WeekPage, WeekPageCrawler, NOT_FOUND_MARKER};

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of fetching one page.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Page body from a success status.
    Page(String),
    /// The transport reported the resource missing.
    NotFound,
}

/// Errors from fetching or parsing a page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches pages with cooperative pacing.
///
/// Implementations delay before each request; they never retry and
/// never fetch in parallel.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ScrapeError>;
}

/// A scrapeable page source: raw content plus a typed parse.
#[async_trait]
pub trait PageScraper {
    /// Typed result of parsing one fetched page.
    type Parsed;

    /// Source name used in logs.
    fn name(&self) -> &'static str;

    /// Canonical URL of the page this source scrapes.
    fn page_url(&self) -> String;

    /// Fetch the raw page body, honoring the source's request pacing.
    async fn fetch_raw(&self) -> Result<String, ScrapeError>;

    /// Parse a fetched page into the typed result.
    fn parse_page(&self, html: &str) -> Result<Self::Parsed, ScrapeError>;

    /// Fetch and parse in one step.
    async fn scrape(&self) -> Result<Self::Parsed, ScrapeError>
    where
        Self: Sync,
    {
        let html = self.fetch_raw().await?;
        self.parse_page(&html)
    }
}
