//! Historical odds commands.

use std::path::PathBuf;

use console::style;

use super::helpers::{
    build_fetcher, build_store, open_audit, print_batch_summary, resolve_years, year_progress,
};
use super::HistoricalCommands;
use crate::config::Settings;
use crate::models::YearBatchEntry;
use crate::scrapers::HistoricalLinesScraper;

const PIPELINE: &str = "historical-lines";

pub(super) async fn run(settings: &Settings, command: HistoricalCommands) -> anyhow::Result<()> {
    match command {
        HistoricalCommands::Scrape {
            year,
            from,
            to,
            dry_run,
        } => scrape(settings, year, from, to, dry_run).await,
        HistoricalCommands::Export { year, output } => export(settings, year, output).await,
        HistoricalCommands::Dump { year } => dump(settings, year).await,
    }
}

fn build_scraper(settings: &Settings) -> anyhow::Result<HistoricalLinesScraper> {
    let fetcher = build_fetcher(settings, settings.scraper.historical_delay_ms)?;
    let store = build_store(settings);
    Ok(HistoricalLinesScraper::new(fetcher, store))
}

async fn scrape(
    settings: &Settings,
    year: Option<i32>,
    from: i32,
    to: i32,
    dry_run: bool,
) -> anyhow::Result<()> {
    let years = resolve_years(year, from, to)?;
    let scraper = build_scraper(settings)?;

    if dry_run {
        println!(
            "{} Dry run: parsing {} seasons without uploading",
            style("→").cyan(),
            years.len()
        );
        for &year in &years {
            match scraper.scrape_season(year).await {
                Ok(games) => {
                    println!("  {} {}: {} games", style("✓").green(), year, games.len())
                }
                Err(e) => println!("  {} {}: {}", style("✗").red(), year, e),
            }
        }
        return Ok(());
    }

    let audit = open_audit(settings);
    let mut tracked = audit.as_ref().and_then(|a| a.start_run(PIPELINE).ok());

    println!("{} Scraping {} seasons", style("→").cyan(), years.len());
    let progress = year_progress(years.len() as u64);

    let mut entries = Vec::with_capacity(years.len());
    let mut total_games = 0usize;

    for &year in &years {
        progress.set_message(format!("season {}", year));
        match scraper.scrape_and_upload(year).await {
            Ok(upload) => {
                total_games += upload.games;
                if let Some(repo) = &audit {
                    let _ = repo.log_action(
                        PIPELINE,
                        "upload",
                        &format!("{}: {} games -> {}", year, upload.games, upload.key),
                    );
                }
                entries.push(YearBatchEntry::ok(year, upload));
            }
            Err(e) => entries.push(YearBatchEntry::failed(year, e.to_string())),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    print_batch_summary("historical odds", &entries);
    println!("  {} {} games uploaded", style("→").dim(), total_games);

    if let (Some(repo), Some(run)) = (&audit, tracked.as_mut()) {
        let _ = repo.complete_run(run, total_games as i64);
    }
    Ok(())
}

async fn export(settings: &Settings, year: i32, output: Option<PathBuf>) -> anyhow::Result<()> {
    let scraper = build_scraper(settings)?;
    let path = scraper.save_csv_to_file(year, output.as_deref()).await?;
    println!("{} CSV written to {}", style("✓").green(), path.display());
    Ok(())
}

async fn dump(settings: &Settings, year: i32) -> anyhow::Result<()> {
    let scraper = build_scraper(settings)?;
    let html = scraper.dump_html(year).await?;
    println!("{}", html);
    Ok(())
}
