//! Live odds snapshot scraper.
//!
//! Single page, single sportsbook. The selectors are placeholders to
//! be refined against the real page markup.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::info;
use uuid::Uuid;

use super::{FetchOutcome, PageFetcher, PageScraper, ScrapeError};
use crate::models::OddsSnapshot;
use crate::storage::{keys, ObjectStore};

const SPORTSBOOK: &str = "DraftKings";
const ODDS_PAGE_URL: &str = "https://sportsbook.draftkings.com/leagues/football/nfl";

/// Pull the first numeric token out of an odds cell, tolerating
/// surrounding markers like "+", "o/u" labels, or arrows.
fn parse_decimal(value: &str) -> Option<f64> {
    let re = Regex::new(r"-?\d+(?:\.\d+)?").ok()?;
    re.find(value).and_then(|m| m.as_str().parse().ok())
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn nth_text(document: &Html, selector: &Selector, n: usize) -> Option<String> {
    document
        .select(selector)
        .nth(n)
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Scraper for a sportsbook's live NFL odds page.
pub struct LiveOddsScraper {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn ObjectStore>,
}

impl LiveOddsScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: Arc<dyn ObjectStore>) -> Self {
        Self { fetcher, store }
    }

    /// Store a snapshot as pretty JSON at a date-and-id key.
    pub async fn store_snapshot(&self, snapshot: &OddsSnapshot) -> Result<String, ScrapeError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let key = keys::odds_snapshot_key(
            &snapshot.sportsbook,
            snapshot.fetched_at.date_naive(),
            Uuid::new_v4(),
        );

        self.store.put(&key, &json, "application/json").await?;
        info!(key, "stored odds snapshot");
        Ok(key)
    }

    /// Fetch, parse, and store one snapshot.
    pub async fn scrape_and_store(&self) -> Result<(OddsSnapshot, String), ScrapeError> {
        let snapshot = self.scrape().await?;
        let key = self.store_snapshot(&snapshot).await?;
        Ok((snapshot, key))
    }
}

#[async_trait]
impl PageScraper for LiveOddsScraper {
    type Parsed = OddsSnapshot;

    fn name(&self) -> &'static str {
        "live-odds"
    }

    fn page_url(&self) -> String {
        ODDS_PAGE_URL.to_string()
    }

    async fn fetch_raw(&self) -> Result<String, ScrapeError> {
        let url = self.page_url();
        match self.fetcher.fetch(&url).await? {
            FetchOutcome::Page(html) => Ok(html),
            FetchOutcome::NotFound => Err(ScrapeError::PageNotFound(url)),
        }
    }

    fn parse_page(&self, html: &str) -> Result<Self::Parsed, ScrapeError> {
        let document = Html::parse_document(html);

        // TODO: refine these selectors once the real page structure of
        // the target sportsbook has been inspected.
        let teams = Selector::parse(".event-cell-participant-name").unwrap();
        let spreads = Selector::parse(".event-cell-spread").unwrap();
        let moneylines = Selector::parse(".event-cell-moneyline").unwrap();
        let totals = Selector::parse(".event-cell-total").unwrap();

        let team1 = first_text(&document, &teams).unwrap_or_else(|| "Unknown".to_string());
        let team2 = nth_text(&document, &teams, 1).unwrap_or_else(|| "Unknown".to_string());

        Ok(OddsSnapshot {
            sportsbook: SPORTSBOOK.to_string(),
            sport: "NFL".to_string(),
            team1,
            team2,
            spread: first_text(&document, &spreads).as_deref().and_then(parse_decimal),
            moneyline: first_text(&document, &moneylines)
                .as_deref()
                .and_then(parse_decimal),
            over_under: first_text(&document, &totals).as_deref().and_then(parse_decimal),
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("-3.5"), Some(-3.5));
        assert_eq!(parse_decimal("+7"), Some(7.0));
        assert_eq!(parse_decimal("o 45.5"), Some(45.5));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("N/A"), None);
    }

    fn scraper() -> LiveOddsScraper {
        struct NoFetch;
        #[async_trait]
        impl PageFetcher for NoFetch {
            async fn fetch(&self, _url: &str) -> Result<FetchOutcome, ScrapeError> {
                Ok(FetchOutcome::NotFound)
            }
        }
        LiveOddsScraper::new(Arc::new(NoFetch), Arc::new(MemoryObjectStore::new()))
    }

    #[test]
    fn test_parse_page_placeholder_selectors() {
        let html = r#"
            <div class="event-cell-participant-name">Chiefs</div>
            <div class="event-cell-participant-name">Raiders</div>
            <div class="event-cell-spread">-3.5</div>
            <div class="event-cell-moneyline">-165</div>
            <div class="event-cell-total">O 45.5</div>
        "#;
        let snapshot = scraper().parse_page(html).unwrap();
        assert_eq!(snapshot.sportsbook, "DraftKings");
        assert_eq!(snapshot.team1, "Chiefs");
        assert_eq!(snapshot.team2, "Raiders");
        assert_eq!(snapshot.spread, Some(-3.5));
        assert_eq!(snapshot.moneyline, Some(-165.0));
        assert_eq!(snapshot.over_under, Some(45.5));
    }

    #[test]
    fn test_parse_page_empty_defaults() {
        let snapshot = scraper().parse_page("<html></html>").unwrap();
        assert_eq!(snapshot.team1, "Unknown");
        assert_eq!(snapshot.team2, "Unknown");
        assert!(snapshot.spread.is_none());
    }
}
