//! Shared helpers for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::config::Settings;
use crate::models::YearBatchEntry;
use crate::repository::AuditRepository;
use crate::scrapers::HttpClient;
use crate::storage::LocalObjectStore;

/// Resolve year flags into an ordered list of years.
pub fn resolve_years(year: Option<i32>, from: i32, to: i32) -> anyhow::Result<Vec<i32>> {
    if let Some(y) = year {
        return Ok(vec![y]);
    }
    if from > to {
        anyhow::bail!("--from {} is after --to {}", from, to);
    }
    Ok((from..=to).collect())
}

/// Build the paced HTTP fetcher for a source.
pub fn build_fetcher(settings: &Settings, delay_ms: u64) -> anyhow::Result<Arc<HttpClient>> {
    let client = HttpClient::with_user_agent(
        Duration::from_secs(settings.scraper.timeout_secs),
        Duration::from_millis(delay_ms),
        settings.scraper.user_agent.as_deref(),
    )
    .context("failed to build HTTP client")?;
    Ok(Arc::new(client))
}

/// Build the object store rooted at the configured data directory.
pub fn build_store(settings: &Settings) -> Arc<LocalObjectStore> {
    Arc::new(LocalObjectStore::new(&settings.storage.data_dir))
}

/// Open the audit repository. Scraping proceeds without run tracking
/// when the database cannot be opened.
pub fn open_audit(settings: &Settings) -> Option<AuditRepository> {
    match AuditRepository::new(&settings.database.path) {
        Ok(repo) => Some(repo),
        Err(e) => {
            warn!(error = %e, "audit database unavailable; continuing without run tracking");
            None
        }
    }
}

/// Progress bar over a batch of years.
pub fn year_progress(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    progress
}

/// Print a per-year success/failure summary for a batch.
pub fn print_batch_summary<T>(label: &str, entries: &[YearBatchEntry<T>]) {
    let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
    println!(
        "{} {}: {} years ok, {} failed",
        style("✓").green(),
        label,
        entries.len() - failed,
        failed
    );
    for entry in entries {
        if let Err(e) = &entry.outcome {
            println!("  {} {}: {}", style("✗").red(), entry.year, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_single_year_wins() {
        assert_eq!(resolve_years(Some(2024), 1952, 2025).unwrap(), vec![2024]);
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_years(None, 2020, 2022).unwrap(), vec![2020, 2021, 2022]);
    }

    #[test]
    fn test_resolve_inverted_range_errors() {
        assert!(resolve_years(None, 2025, 2020).is_err());
    }
}
