//! References to per-game boxscore pages.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Site base joined with relative boxscore paths.
pub const BOXSCORE_BASE_URL: &str = "https://www.pro-football-reference.com";

/// Minimum length of a valid game identifier: an 8-digit date, a
/// separator byte, and at least a 3-character team code.
pub const MIN_GAME_ID_LEN: usize = 12;

/// Errors from decomposing a game identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameIdError {
    #[error("game id too short: {0:?}")]
    TooShort(String),
    #[error("malformed game id: {0:?}")]
    Malformed(String),
    #[error("game id has no valid calendar date: {0:?}")]
    InvalidDate(String),
}

fn game_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 4-digit year, 2-digit month, 2-digit day, separator byte, team code.
    RE.get_or_init(|| Regex::new(r"^(\d{4})(\d{2})(\d{2}).(.+)$").unwrap())
}

/// A reference to a game's boxscore page, extracted from a week
/// summary page. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReference {
    /// Identifier from the boxscore filename (e.g. "202409050kan").
    pub game_id: String,
    /// Season year.
    pub year: i32,
    /// Week number within the season.
    pub week: u32,
    /// Date of the game.
    pub game_date: NaiveDate,
    /// Home team code from the identifier (e.g. "kan").
    pub home_team_code: String,
    /// Relative boxscore path (e.g. "/boxscores/202409050kan.htm").
    pub boxscore_path: String,
}

impl GameReference {
    /// CSV header for reference exports.
    pub const CSV_HEADER: &'static str = "GameId,Year,Week,GameDate,HomeTeamCode,BoxscoreUrl";

    /// Candidate identifier for a boxscore path: the filename without
    /// its extension.
    pub fn game_id_from_path(path: &str) -> &str {
        let filename = path.rsplit('/').next().unwrap_or(path);
        filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(filename)
    }

    /// Decompose a game identifier into (year, month, day, team code).
    pub fn parse_game_id(game_id: &str) -> Result<(i32, u32, u32, &str), GameIdError> {
        if game_id.len() < MIN_GAME_ID_LEN {
            return Err(GameIdError::TooShort(game_id.to_string()));
        }

        let caps = game_id_regex()
            .captures(game_id)
            .ok_or_else(|| GameIdError::Malformed(game_id.to_string()))?;

        // The digit groups always parse once the pattern matched.
        let year = caps[1]
            .parse()
            .map_err(|_| GameIdError::Malformed(game_id.to_string()))?;
        let month = caps[2]
            .parse()
            .map_err(|_| GameIdError::Malformed(game_id.to_string()))?;
        let day = caps[3]
            .parse()
            .map_err(|_| GameIdError::Malformed(game_id.to_string()))?;
        let team = caps.get(4).map_or("", |m| m.as_str());

        Ok((year, month, day, team))
    }

    /// Build a reference from a relative boxscore path.
    ///
    /// The game date combines the season year with the identifier's
    /// month and day.
    pub fn from_boxscore_path(path: &str, year: i32, week: u32) -> Result<Self, GameIdError> {
        let game_id = Self::game_id_from_path(path);
        let (_, month, day, team_code) = Self::parse_game_id(game_id)?;

        let game_date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| GameIdError::InvalidDate(game_id.to_string()))?;

        Ok(Self {
            game_id: game_id.to_string(),
            year,
            week,
            game_date,
            home_team_code: team_code.to_string(),
            boxscore_path: path.to_string(),
        })
    }

    /// Absolute URL of the boxscore page.
    pub fn full_url(&self) -> String {
        match Url::parse(BOXSCORE_BASE_URL).and_then(|base| base.join(&self.boxscore_path)) {
            Ok(url) => url.into(),
            Err(_) => format!("{}{}", BOXSCORE_BASE_URL, self.boxscore_path),
        }
    }

    /// One CSV line for reference exports.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.game_id,
            self.year,
            self.week,
            self.game_date.format("%Y-%m-%d"),
            self.home_team_code,
            self.boxscore_path,
        )
    }
}

impl fmt::Display for GameReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Week {}, {})",
            self.game_id,
            self.week,
            self.game_date.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_game_id() {
        let (year, month, day, team) = GameReference::parse_game_id("202409050kan").unwrap();
        assert_eq!(year, 2024);
        assert_eq!(month, 9);
        assert_eq!(day, 5);
        assert_eq!(team, "kan");
    }

    #[test]
    fn test_parse_game_id_rejects_short() {
        assert_eq!(
            GameReference::parse_game_id("20240905kan"),
            Err(GameIdError::TooShort("20240905kan".to_string()))
        );
        assert!(matches!(
            GameReference::parse_game_id(""),
            Err(GameIdError::TooShort(_))
        ));
    }

    #[test]
    fn test_parse_game_id_rejects_non_numeric_date() {
        assert!(matches!(
            GameReference::parse_game_id("2024O9050kansas"),
            Err(GameIdError::Malformed(_))
        ));
    }

    #[test]
    fn test_game_id_from_path() {
        assert_eq!(
            GameReference::game_id_from_path("/boxscores/202409050kan.htm"),
            "202409050kan"
        );
        assert_eq!(GameReference::game_id_from_path("202409050kan.htm"), "202409050kan");
    }

    #[test]
    fn test_from_boxscore_path() {
        let r = GameReference::from_boxscore_path("/boxscores/202409050kan.htm", 2024, 1).unwrap();
        assert_eq!(r.game_id, "202409050kan");
        assert_eq!(r.year, 2024);
        assert_eq!(r.week, 1);
        assert_eq!(r.game_date, NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());
        assert_eq!(r.home_team_code, "kan");
        assert_eq!(r.boxscore_path, "/boxscores/202409050kan.htm");
    }

    #[test]
    fn test_from_boxscore_path_rejects_impossible_date() {
        assert!(matches!(
            GameReference::from_boxscore_path("/boxscores/202413990kan.htm", 2024, 1),
            Err(GameIdError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_full_url_joins_base() {
        let r = GameReference::from_boxscore_path("/boxscores/202409050kan.htm", 2024, 1).unwrap();
        assert_eq!(
            r.full_url(),
            "https://www.pro-football-reference.com/boxscores/202409050kan.htm"
        );
    }

    #[test]
    fn test_to_csv_line() {
        let r = GameReference::from_boxscore_path("/boxscores/202409050kan.htm", 2024, 1).unwrap();
        assert_eq!(
            r.to_csv_line(),
            "202409050kan,2024,1,2024-09-05,kan,/boxscores/202409050kan.htm"
        );
    }
}
