//! Rows parsed from historical odds tables.
//!
//! A season page embeds one table body per week or playoff round. Each
//! game row carries the spread, the final score, and bold markup on the
//! side that covered.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side covered the spread, derived from bold markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoveredBy {
    Favorite,
    Underdog,
    Unknown,
}

impl CoveredBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favorite => "Favorite",
            Self::Underdog => "Underdog",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CoveredBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single game row from a historical odds table.
///
/// Constructed once per parsed row and immutable afterwards. Older
/// seasons are missing trailing columns, so every string field may be
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalGameRow {
    /// Season year (e.g. 2024).
    pub year: i32,
    /// Day of the week ("Sun", "Mon", ...).
    pub day: String,
    /// Date of the game as printed on the page (e.g. "Nov 10").
    pub date: String,
    /// Game time (e.g. "1:00PM").
    pub time: String,
    /// Location marker for the favorite ("@" away, "N" neutral, empty home).
    pub favorite_location: String,
    /// Favorite team name.
    pub favorite: String,
    /// Final score (e.g. "27-24").
    pub score: String,
    /// Spread result (e.g. "W -3").
    pub spread_result: String,
    /// Location marker for the underdog.
    pub underdog_location: String,
    /// Underdog team name.
    pub underdog: String,
    /// Over/under result (e.g. "O 45.5").
    pub over_under_result: String,
    /// Free-text notes: "OT", or the playoff round name.
    pub notes: String,
    /// Favorite shown bold on the page (covered the spread).
    pub favorite_covered: bool,
    /// Underdog shown bold on the page.
    pub underdog_covered: bool,
}

impl HistoricalGameRow {
    /// Which side covered. The source allows both bold flags to be set
    /// or neither; the favorite wins on conflict and neither maps to
    /// `Unknown`.
    pub fn covered_by(&self) -> CoveredBy {
        if self.favorite_covered {
            CoveredBy::Favorite
        } else if self.underdog_covered {
            CoveredBy::Underdog
        } else {
            CoveredBy::Unknown
        }
    }
}

impl fmt::Display for HistoricalGameRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} | {}{} vs {}{} | Score: {} | Spread: {} | O/U: {} | Covered: {}",
            self.day,
            self.date,
            self.time,
            self.favorite_location,
            self.favorite,
            self.underdog_location,
            self.underdog,
            self.score,
            self.spread_result,
            self.over_under_result,
            self.covered_by(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> HistoricalGameRow {
        HistoricalGameRow {
            year: 2024,
            day: "Sun".to_string(),
            date: "Nov 10".to_string(),
            time: "1:00PM".to_string(),
            favorite_location: String::new(),
            favorite: "Chiefs".to_string(),
            score: "27-24".to_string(),
            spread_result: "W -3".to_string(),
            underdog_location: String::new(),
            underdog: "Raiders".to_string(),
            over_under_result: "O 45.5".to_string(),
            notes: String::new(),
            favorite_covered: false,
            underdog_covered: false,
        }
    }

    #[test]
    fn test_covered_by_favorite() {
        let mut r = row();
        r.favorite_covered = true;
        assert_eq!(r.covered_by(), CoveredBy::Favorite);
    }

    #[test]
    fn test_covered_by_underdog() {
        let mut r = row();
        r.underdog_covered = true;
        assert_eq!(r.covered_by(), CoveredBy::Underdog);
    }

    #[test]
    fn test_covered_by_unknown_when_neither_bold() {
        assert_eq!(row().covered_by(), CoveredBy::Unknown);
    }

    #[test]
    fn test_covered_by_favors_favorite_on_conflict() {
        let mut r = row();
        r.favorite_covered = true;
        r.underdog_covered = true;
        assert_eq!(r.covered_by(), CoveredBy::Favorite);
    }
}
