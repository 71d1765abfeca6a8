//! Live odds snapshot command.

use console::style;

use super::helpers::{build_fetcher, build_store, open_audit};
use crate::config::Settings;
use crate::scrapers::{LiveOddsScraper, PageScraper};

const PIPELINE: &str = "live-odds";

pub(super) async fn run(settings: &Settings, dry_run: bool) -> anyhow::Result<()> {
    let fetcher = build_fetcher(settings, settings.scraper.live_delay_ms)?;
    let store = build_store(settings);
    let scraper = LiveOddsScraper::new(fetcher, store);

    if dry_run {
        let snapshot = scraper.scrape().await?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let audit = open_audit(settings);
    let mut tracked = audit.as_ref().and_then(|a| a.start_run(PIPELINE).ok());

    match scraper.scrape_and_store().await {
        Ok((snapshot, key)) => {
            println!(
                "{} {} vs {} stored at {}",
                style("✓").green(),
                snapshot.team1,
                snapshot.team2,
                key
            );
            if let (Some(repo), Some(run)) = (&audit, tracked.as_mut()) {
                let _ = repo.complete_run(run, 1);
            }
            Ok(())
        }
        Err(e) => {
            if let (Some(repo), Some(run)) = (&audit, tracked.as_mut()) {
                let _ = repo.fail_run(run, &e.to_string());
            }
            Err(e.into())
        }
    }
}
