//! Two-stage extract/promote pipeline over archived week pages.
//!
//! The crawler archives raw pages under the unprocessed prefix; this
//! service extracts typed game references from them and promotes each
//! processed input to its done location. Every step is keyed
//! deterministically, so re-running any week is an idempotent
//! overwrite.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::models::{GameReference, WeekExtractionResult, YearBatchEntry, YearExtractionResult};
use crate::scrapers::{extract_references, references_to_csv};
use crate::storage::{keys, ObjectStore, StorageError};

/// Orchestrator for per-week reference extraction.
pub struct ExtractionPipeline {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl ExtractionPipeline {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Extract one week's references and store them as CSV.
    ///
    /// Never panics and never returns an error: every failure mode is
    /// folded into the result. An absent artifact here means "never
    /// scraped or already processed", reported as a failed week - it
    /// is not a crawl-stop signal.
    pub async fn extract_week(
        &self,
        year: i32,
        week: u32,
        keep_source: bool,
    ) -> WeekExtractionResult {
        info!(year, week, "extracting game references");

        let source_key = keys::week_unprocessed_key(&self.prefix, year, week);
        let html = match self.store.get(&source_key).await {
            Ok(Some(html)) => html,
            Ok(None) => {
                let message = format!("week page not found at {}", source_key);
                warn!(year, week, "{}", message);
                return WeekExtractionResult::failed(year, week, message);
            }
            Err(e) => {
                error!(year, week, error = %e, "failed to read week page");
                return WeekExtractionResult::failed(year, week, e.to_string());
            }
        };

        let references = extract_references(&html, year, week);
        if references.is_empty() {
            warn!(year, week, "no games found in week page");
            return WeekExtractionResult::failed(year, week, "no games found in week page");
        }

        let csv = references_to_csv(&references);
        let output_key = keys::game_references_key(&self.prefix, year, week);
        if let Err(e) = self.store.put(&output_key, &csv, "text/csv").await {
            error!(year, week, key = output_key, error = %e, "failed to store reference CSV");
            return WeekExtractionResult::failed(year, week, e.to_string());
        }
        info!(
            year,
            week,
            count = references.len(),
            key = output_key,
            "stored game references"
        );

        if !keep_source {
            if let Err(e) = self.promote(&source_key, year, week).await {
                return WeekExtractionResult::failed(
                    year,
                    week,
                    format!("promotion failed: {}", e),
                );
            }
        }

        WeekExtractionResult::ok(year, week, references.len(), output_key)
    }

    /// Relocate a processed input from unprocessed to processed.
    ///
    /// Copy-then-delete: a delete failure after a successful copy
    /// leaves the artifact at both keys. That window is reported, not
    /// masked.
    async fn promote(&self, source_key: &str, year: i32, week: u32) -> Result<(), StorageError> {
        let processed_key = keys::week_processed_key(&self.prefix, year, week);
        self.store.copy(source_key, &processed_key).await?;

        if let Err(e) = self.store.delete(source_key).await {
            warn!(
                src = source_key,
                dst = processed_key,
                error = %e,
                "copy succeeded but delete failed; artifact present at both keys"
            );
            return Err(e);
        }

        info!(src = source_key, dst = processed_key, "promoted week page");
        Ok(())
    }

    /// Parse one week's references without writing or promoting.
    ///
    /// An absent artifact yields an empty list.
    pub async fn extract_week_dry_run(
        &self,
        year: i32,
        week: u32,
    ) -> Result<Vec<GameReference>, StorageError> {
        let source_key = keys::week_unprocessed_key(&self.prefix, year, week);
        match self.store.get(&source_key).await? {
            Some(html) => Ok(extract_references(&html, year, week)),
            None => {
                warn!(year, week, key = source_key, "dry run: week page not found");
                Ok(Vec::new())
            }
        }
    }

    /// Extract every archived week of a season, starting at week 1.
    ///
    /// The loop advances while the unprocessed artifact for the next
    /// week exists; the first absent artifact ends the season cleanly.
    /// A week that fails extraction is recorded and the next week is
    /// still attempted.
    pub async fn extract_year(
        &self,
        year: i32,
        keep_source: bool,
    ) -> Result<YearExtractionResult, StorageError> {
        info!(year, "extracting game references for season");

        let mut weeks = Vec::new();
        let mut week: u32 = 1;

        loop {
            let source_key = keys::week_unprocessed_key(&self.prefix, year, week);
            if self.store.get(&source_key).await?.is_none() {
                info!(year, last_week = week - 1, "no more unprocessed weeks");
                break;
            }

            weeks.push(self.extract_week(year, week, keep_source).await);
            week += 1;
        }

        let result = YearExtractionResult { year, weeks };
        info!(
            year,
            games = result.total_games(),
            ok_weeks = result.successful_weeks(),
            failed_weeks = result.failed_weeks(),
            "completed season extraction"
        );
        Ok(result)
    }

    /// Count extractable references per archived week without writing.
    pub async fn extract_year_dry_run(
        &self,
        year: i32,
    ) -> Result<Vec<(u32, usize)>, StorageError> {
        let mut counts = Vec::new();
        let mut week: u32 = 1;

        loop {
            let source_key = keys::week_unprocessed_key(&self.prefix, year, week);
            if self.store.get(&source_key).await?.is_none() {
                break;
            }
            let references = self.extract_week_dry_run(year, week).await?;
            counts.push((week, references.len()));
            week += 1;
        }

        Ok(counts)
    }

    /// Extract a list of seasons in order with per-year isolation.
    pub async fn extract_years(
        &self,
        years: &[i32],
        keep_source: bool,
    ) -> Vec<YearBatchEntry<YearExtractionResult>> {
        let mut results = Vec::with_capacity(years.len());

        for &year in years {
            match self.extract_year(year, keep_source).await {
                Ok(result) => results.push(YearBatchEntry::ok(year, result)),
                Err(e) => {
                    error!(year, error = %e, "season extraction failed, continuing to next year");
                    results.push(YearBatchEntry::failed(year, e.to_string()));
                }
            }
        }

        results
    }
}
