//! Game-reference extraction commands.

use console::style;

use super::helpers::{build_store, open_audit, print_batch_summary, resolve_years, year_progress};
use super::ExtractCommands;
use crate::config::Settings;
use crate::models::{WeekExtractionResult, YearBatchEntry};
use crate::services::ExtractionPipeline;

const PIPELINE: &str = "game-references";

pub(super) async fn run(settings: &Settings, command: ExtractCommands) -> anyhow::Result<()> {
    match command {
        ExtractCommands::Week {
            year,
            week,
            keep_source,
            dry_run,
        } => extract_week(settings, year, week, keep_source, dry_run).await,
        ExtractCommands::Year {
            year,
            from,
            to,
            keep_source,
            dry_run,
        } => extract_years(settings, year, from, to, keep_source, dry_run).await,
    }
}

fn build_pipeline(settings: &Settings) -> ExtractionPipeline {
    ExtractionPipeline::new(build_store(settings), &settings.storage.week_pages_prefix)
}

fn print_week(result: &WeekExtractionResult) {
    if result.success() {
        println!(
            "  {} {} week {}: {} games -> {}",
            style("✓").green(),
            result.year,
            result.week,
            result.game_count,
            result.output_key.as_deref().unwrap_or(""),
        );
    } else {
        println!(
            "  {} {} week {}: {}",
            style("✗").red(),
            result.year,
            result.week,
            result.error.as_deref().unwrap_or("unknown error"),
        );
    }
}

async fn extract_week(
    settings: &Settings,
    year: i32,
    week: u32,
    keep_source: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(settings);

    if dry_run {
        let references = pipeline.extract_week_dry_run(year, week).await?;
        println!(
            "{} Dry run: {} week {}: {} games",
            style("→").cyan(),
            year,
            week,
            references.len()
        );
        for reference in &references {
            println!("  {} {}", style("→").dim(), reference);
        }
        return Ok(());
    }

    let result = pipeline.extract_week(year, week, keep_source).await;
    print_week(&result);
    Ok(())
}

async fn extract_years(
    settings: &Settings,
    year: Option<i32>,
    from: i32,
    to: i32,
    keep_source: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let years = resolve_years(year, from, to)?;
    let pipeline = build_pipeline(settings);

    if dry_run {
        println!(
            "{} Dry run: counting references without writing",
            style("→").cyan()
        );
        for &year in &years {
            let counts = pipeline.extract_year_dry_run(year).await?;
            for (week, count) in counts {
                println!("  {} {} week {}: {} games", style("→").dim(), year, week, count);
            }
        }
        return Ok(());
    }

    let audit = open_audit(settings);
    let mut tracked = audit.as_ref().and_then(|a| a.start_run(PIPELINE).ok());

    println!("{} Extracting {} seasons", style("→").cyan(), years.len());
    let progress = year_progress(years.len() as u64);

    let mut entries = Vec::with_capacity(years.len());
    let mut total_games = 0usize;

    for &year in &years {
        progress.set_message(format!("season {}", year));
        match pipeline.extract_year(year, keep_source).await {
            Ok(result) => {
                total_games += result.total_games();
                entries.push(YearBatchEntry::ok(year, result));
            }
            Err(e) => entries.push(YearBatchEntry::failed(year, e.to_string())),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    print_batch_summary("game references", &entries);
    for entry in &entries {
        if let Ok(result) = &entry.outcome {
            for week in &result.weeks {
                print_week(week);
            }
        }
    }
    println!("  {} {} games referenced", style("→").dim(), total_games);

    if let (Some(repo), Some(run)) = (&audit, tracked.as_mut()) {
        let _ = repo.complete_run(run, total_games as i64);
    }
    Ok(())
}
