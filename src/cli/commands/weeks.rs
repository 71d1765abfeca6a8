//! Week-page crawl command.

use console::style;

use super::helpers::{
    build_fetcher, build_store, open_audit, print_batch_summary, resolve_years, year_progress,
};
use super::WeekCommands;
use crate::config::Settings;
use crate::models::YearBatchEntry;
use crate::scrapers::WeekPageCrawler;

const PIPELINE: &str = "week-pages";

pub(super) async fn run(settings: &Settings, command: WeekCommands) -> anyhow::Result<()> {
    match command {
        WeekCommands::Crawl {
            year,
            from,
            to,
            dry_run,
            max_weeks,
        } => crawl(settings, year, from, to, dry_run, max_weeks).await,
    }
}

async fn crawl(
    settings: &Settings,
    year: Option<i32>,
    from: i32,
    to: i32,
    dry_run: bool,
    max_weeks: Option<u32>,
) -> anyhow::Result<()> {
    let years = resolve_years(year, from, to)?;
    let fetcher = build_fetcher(settings, settings.scraper.week_pages_delay_ms)?;
    let store = build_store(settings);
    let crawler = WeekPageCrawler::new(fetcher, store, &settings.storage.week_pages_prefix);

    let audit = if dry_run { None } else { open_audit(settings) };
    let mut tracked = audit.as_ref().and_then(|a| a.start_run(PIPELINE).ok());

    if dry_run {
        println!(
            "{} Dry run: crawling {} seasons without storing",
            style("→").cyan(),
            years.len()
        );
    } else {
        println!("{} Crawling {} seasons", style("→").cyan(), years.len());
    }
    let progress = year_progress(years.len() as u64);

    let mut entries = Vec::with_capacity(years.len());
    let mut total_weeks = 0usize;

    for &year in &years {
        progress.set_message(format!("season {}", year));
        match crawler.crawl_season(year, dry_run, max_weeks).await {
            Ok(crawl) => {
                total_weeks += crawl.stored_weeks();
                entries.push(YearBatchEntry::ok(year, crawl));
            }
            Err(e) => entries.push(YearBatchEntry::failed(year, e.to_string())),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    print_batch_summary("week pages", &entries);
    if dry_run {
        for entry in &entries {
            if let Ok(crawl) = &entry.outcome {
                for week in &crawl.weeks {
                    println!(
                        "  {} {} week {}: {} bytes -> {}",
                        style("→").dim(),
                        entry.year,
                        week.week,
                        week.content_len,
                        week.key
                    );
                }
            }
        }
    } else {
        println!("  {} {} week pages stored", style("→").dim(), total_weeks);
    }

    if let (Some(repo), Some(run)) = (&audit, tracked.as_mut()) {
        let _ = repo.complete_run(run, total_weeks as i64);
    }
    Ok(())
}
