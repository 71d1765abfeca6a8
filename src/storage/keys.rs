//! Deterministic object-store keys.
//!
//! Re-runs of any stage overwrite the same keys instead of
//! accumulating duplicates.

use chrono::NaiveDate;
use uuid::Uuid;

/// Key for a season's historical odds CSV.
pub fn season_csv_key(year: i32) -> String {
    format!("historical-lines-data/{}_nfl_odds.csv", year)
}

/// Key for a raw week page awaiting extraction.
pub fn week_unprocessed_key(prefix: &str, year: i32, week: u32) -> String {
    format!("{}/unprocessed/{}/week{}.html", prefix, year, week)
}

/// Key a week page is promoted to after extraction.
pub fn week_processed_key(prefix: &str, year: i32, week: u32) -> String {
    format!("{}/weeks/processed/{}/week{}.html", prefix, year, week)
}

/// Key for a week's game-reference CSV.
pub fn game_references_key(prefix: &str, year: i32, week: u32) -> String {
    format!("{}/game-references/{}/week{}.csv", prefix, year, week)
}

/// Key for a live odds snapshot. Snapshots are point-in-time captures,
/// so the key carries a fresh id rather than overwriting.
pub fn odds_snapshot_key(sportsbook: &str, date: NaiveDate, id: Uuid) -> String {
    format!(
        "{}/{}/odds-{}.json",
        sportsbook.to_lowercase(),
        date.format("%Y-%m-%d"),
        id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_csv_key() {
        assert_eq!(season_csv_key(2024), "historical-lines-data/2024_nfl_odds.csv");
    }

    #[test]
    fn test_week_keys() {
        assert_eq!(
            week_unprocessed_key("pff-historical-games", 2024, 3),
            "pff-historical-games/unprocessed/2024/week3.html"
        );
        assert_eq!(
            week_processed_key("pff-historical-games", 2024, 3),
            "pff-historical-games/weeks/processed/2024/week3.html"
        );
        assert_eq!(
            game_references_key("pff-historical-games", 2024, 3),
            "pff-historical-games/game-references/2024/week3.csv"
        );
    }

    #[test]
    fn test_odds_snapshot_key_lowercases_sportsbook() {
        let id = Uuid::nil();
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(
            odds_snapshot_key("DraftKings", date, id),
            format!("draftkings/2026-08-06/odds-{}.json", id)
        );
    }
}
