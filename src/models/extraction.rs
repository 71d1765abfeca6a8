//! Results of the week-page extraction pipeline.

use serde::Serialize;

/// Outcome of extracting game references from a single week's page.
///
/// One instance per attempted week; failed weeks are reported, never
/// retried automatically.
#[derive(Debug, Clone, Serialize)]
pub struct WeekExtractionResult {
    pub year: i32,
    pub week: u32,
    /// Number of references extracted.
    pub game_count: usize,
    /// Object-store key of the reference CSV, when written.
    pub output_key: Option<String>,
    /// Human-readable failure message.
    pub error: Option<String>,
}

impl WeekExtractionResult {
    pub fn ok(year: i32, week: u32, game_count: usize, output_key: String) -> Self {
        Self {
            year,
            week,
            game_count,
            output_key: Some(output_key),
            error: None,
        }
    }

    pub fn failed(year: i32, week: u32, error: impl Into<String>) -> Self {
        Self {
            year,
            week,
            game_count: 0,
            output_key: None,
            error: Some(error.into()),
        }
    }

    /// Success iff no error was recorded and an output key exists.
    pub fn success(&self) -> bool {
        self.error.is_none() && self.output_key.is_some()
    }
}

/// Ordered per-week results for one season's extraction.
///
/// Totals are always recomputed from the week sequence.
#[derive(Debug, Clone, Serialize)]
pub struct YearExtractionResult {
    pub year: i32,
    pub weeks: Vec<WeekExtractionResult>,
}

impl YearExtractionResult {
    pub fn total_games(&self) -> usize {
        self.weeks.iter().map(|w| w.game_count).sum()
    }

    pub fn successful_weeks(&self) -> usize {
        self.weeks.iter().filter(|w| w.success()).count()
    }

    pub fn failed_weeks(&self) -> usize {
        self.weeks.iter().filter(|w| !w.success()).count()
    }
}

/// One year's entry in a multi-year batch.
///
/// A failed year carries its error as a first-class variant; the batch
/// continues past it.
#[derive(Debug)]
pub struct YearBatchEntry<T> {
    pub year: i32,
    pub outcome: Result<T, String>,
}

impl<T> YearBatchEntry<T> {
    pub fn ok(year: i32, value: T) -> Self {
        Self {
            year,
            outcome: Ok(value),
        }
    }

    pub fn failed(year: i32, error: impl Into<String>) -> Self {
        Self {
            year,
            outcome: Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_result_success_requires_key_and_no_error() {
        assert!(WeekExtractionResult::ok(2024, 1, 16, "k".to_string()).success());
        assert!(!WeekExtractionResult::failed(2024, 1, "missing").success());
    }

    #[test]
    fn test_year_result_totals_recomputed() {
        let year = YearExtractionResult {
            year: 2024,
            weeks: vec![
                WeekExtractionResult::ok(2024, 1, 16, "a".to_string()),
                WeekExtractionResult::failed(2024, 2, "no games found"),
                WeekExtractionResult::ok(2024, 3, 14, "b".to_string()),
            ],
        };
        assert_eq!(year.total_games(), 30);
        assert_eq!(year.successful_weeks(), 2);
        assert_eq!(year.failed_weeks(), 1);
    }
}
