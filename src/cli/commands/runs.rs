//! Pipeline run listing command.

use console::style;

use crate::config::Settings;
use crate::models::RunStatus;
use crate::repository::AuditRepository;

pub(super) fn run(settings: &Settings, limit: usize) -> anyhow::Result<()> {
    let repo = AuditRepository::new(&settings.database.path)?;
    let runs = repo.recent_runs(limit)?;

    if runs.is_empty() {
        println!("{} No pipeline runs recorded", style("!").yellow());
        return Ok(());
    }

    for run in runs {
        let marker = match run.status {
            RunStatus::Succeeded => style("✓").green(),
            RunStatus::Failed => style("✗").red(),
            RunStatus::Running => style("…").yellow(),
        };
        let completed = run
            .completed_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {} started {} completed {} records {}{}",
            marker,
            run.pipeline,
            run.status.as_str(),
            run.started_at.to_rfc3339(),
            completed,
            run.records_processed,
            run.error_message
                .as_deref()
                .map(|e| format!(" error: {}", e))
                .unwrap_or_default(),
        );
    }
    Ok(())
}
