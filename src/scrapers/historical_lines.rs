//! Historical odds table scraper.
//!
//! Season pages embed one `<tbody>` per week or playoff round, with two
//! row layouts inside identical markup: regular-season rows lead with
//! the weekday, playoff rows lead with the round name and shift every
//! column right by one. Stat and header rows are interleaved in the
//! same tables and must be skipped, never errored on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{error, info};

use super::{FetchOutcome, PageFetcher, PageScraper, ScrapeError};
use crate::models::{HistoricalGameRow, YearBatchEntry};
use crate::storage::{keys, ObjectStore};

/// Season page URL, completed by appending the year.
pub const SEASON_URL_BASE: &str = "https://www.covers.com/sportsoddshistory/nfl-game-season/?y=";

/// CSV header for season exports.
pub const CSV_HEADER: &str = "Year,Day,Date,Time,FavoriteLocation,Favorite,Score,SpreadResult,\
                              UnderdogLocation,Underdog,OverUnderResult,Notes,FavoriteCovered,\
                              UnderdogCovered,CoveredBy";

/// Weekday abbreviations that begin a game row.
const GAME_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn is_game_day(text: &str) -> bool {
    GAME_DAYS.iter().any(|d| d.eq_ignore_ascii_case(text))
}

/// One table cell, reduced to normalized text plus its bold flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCell {
    pub text: String,
    pub bold: bool,
}

impl RowCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Cell text at an index; out of range reads as empty.
fn cell_text(cells: &[RowCell], index: usize) -> &str {
    cells.get(index).map(|c| c.text.as_str()).unwrap_or("")
}

/// Bold flag at an index; out of range reads as not bold.
fn cell_bold(cells: &[RowCell], index: usize) -> bool {
    cells.get(index).map(|c| c.bold).unwrap_or(false)
}

/// Classify a row's layout and map it to a game row.
///
/// Returns `None` for anything that is not a game row: too few cells,
/// or neither of the first two cells naming a weekday. Missing trailing
/// columns on older seasons map to empty fields, never to an error.
pub fn classify_and_map(cells: &[RowCell], year: i32) -> Option<HistoricalGameRow> {
    // Day, date, time plus some team data at minimum.
    if cells.len() < 5 {
        return None;
    }

    let cell0 = cell_text(cells, 0);
    let cell1 = cell_text(cells, 1);

    let (offset, day, notes) = if is_game_day(cell0) {
        // Regular season: day leads, notes in a fixed trailing column.
        (0, cell0, cell_text(cells, 10).to_string())
    } else if is_game_day(cell1) {
        // Playoffs: the round name leads and becomes the notes field.
        (1, cell1, cell0.to_string())
    } else {
        return None;
    };

    Some(HistoricalGameRow {
        year,
        day: day.to_string(),
        date: cell_text(cells, 1 + offset).to_string(),
        time: cell_text(cells, 2 + offset).to_string(),
        favorite_location: cell_text(cells, 3 + offset).to_string(),
        favorite: cell_text(cells, 4 + offset).to_string(),
        score: cell_text(cells, 5 + offset).to_string(),
        spread_result: cell_text(cells, 6 + offset).to_string(),
        underdog_location: cell_text(cells, 7 + offset).to_string(),
        underdog: cell_text(cells, 8 + offset).to_string(),
        over_under_result: cell_text(cells, 9 + offset).to_string(),
        notes,
        favorite_covered: cell_bold(cells, 4 + offset),
        underdog_covered: cell_bold(cells, 8 + offset),
    })
}

/// Collapse a cell's text content, mapping whitespace-only and
/// non-breaking-space-only cells to empty.
fn normalize_cell_text(raw: &str) -> String {
    let text = raw.trim();
    if text == "\u{a0}" {
        return String::new();
    }
    text.to_string()
}

/// A cell is bold when it contains bold-emphasis markup, an inline
/// bold font-weight, or a bold-ish class name.
fn element_is_bold(cell: ElementRef<'_>, bold_sel: &Selector) -> bool {
    if cell.select(bold_sel).next().is_some() {
        return true;
    }

    let style = cell.value().attr("style").unwrap_or("");
    if style.contains("font-weight") && (style.contains("bold") || style.contains("700")) {
        return true;
    }

    let class = cell.value().attr("class").unwrap_or("");
    class.to_lowercase().contains("bold")
}

fn cell_from_element(cell: ElementRef<'_>, bold_sel: &Selector) -> RowCell {
    let raw: String = cell.text().collect();
    RowCell {
        text: normalize_cell_text(&raw),
        bold: element_is_bold(cell, bold_sel),
    }
}

/// Walk every table body in document order and map every game row.
///
/// Append order across bodies is the season's canonical ordering; no
/// re-sort is performed.
pub fn extract_season(document: &Html, year: i32) -> Vec<HistoricalGameRow> {
    let tbody_sel = Selector::parse("tbody").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();
    let bold_sel = Selector::parse("b, strong").unwrap();

    let mut games = Vec::new();

    for tbody in document.select(&tbody_sel) {
        for row in tbody.select(&tr_sel) {
            let cells: Vec<RowCell> = row
                .select(&td_sel)
                .map(|td| cell_from_element(td, &bold_sel))
                .collect();

            if let Some(game) = classify_and_map(&cells, year) {
                games.push(game);
            }
        }
    }

    games
}

/// Quote a CSV field when it contains a comma, quote, or newline.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Serialize a season's rows to CSV, header first, one line per game.
pub fn to_csv(games: &[HistoricalGameRow]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');

    for game in games {
        let line = format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            game.year,
            escape_csv(&game.day),
            escape_csv(&game.date),
            escape_csv(&game.time),
            escape_csv(&game.favorite_location),
            escape_csv(&game.favorite),
            escape_csv(&game.score),
            escape_csv(&game.spread_result),
            escape_csv(&game.underdog_location),
            escape_csv(&game.underdog),
            escape_csv(&game.over_under_result),
            escape_csv(&game.notes),
            game.favorite_covered,
            game.underdog_covered,
            game.covered_by(),
        );
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// One historical-odds season page, bound to a scrape year.
pub struct SeasonPage {
    fetcher: Arc<dyn PageFetcher>,
    pub year: i32,
}

#[async_trait]
impl PageScraper for SeasonPage {
    type Parsed = Vec<HistoricalGameRow>;

    fn name(&self) -> &'static str {
        "historical-lines"
    }

    fn page_url(&self) -> String {
        format!("{}{}", SEASON_URL_BASE, self.year)
    }

    async fn fetch_raw(&self) -> Result<String, ScrapeError> {
        let url = self.page_url();
        match self.fetcher.fetch(&url).await? {
            FetchOutcome::Page(html) => Ok(html),
            FetchOutcome::NotFound => Err(ScrapeError::PageNotFound(url)),
        }
    }

    fn parse_page(&self, html: &str) -> Result<Self::Parsed, ScrapeError> {
        let document = Html::parse_document(html);
        Ok(extract_season(&document, self.year))
    }
}

/// Result of one season's scrape-and-upload.
#[derive(Debug, Clone)]
pub struct SeasonUpload {
    /// Object-store key of the uploaded CSV.
    pub key: String,
    /// Number of games parsed.
    pub games: usize,
}

/// Scraper for the historical odds source.
pub struct HistoricalLinesScraper {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn ObjectStore>,
}

impl HistoricalLinesScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: Arc<dyn ObjectStore>) -> Self {
        Self { fetcher, store }
    }

    /// Bind a season page for the given year.
    pub fn season(&self, year: i32) -> SeasonPage {
        SeasonPage {
            fetcher: self.fetcher.clone(),
            year,
        }
    }

    /// Fetch and parse a season's games.
    pub async fn scrape_season(&self, year: i32) -> Result<Vec<HistoricalGameRow>, ScrapeError> {
        let page = self.season(year);
        info!(source = page.name(), year, url = %page.page_url(), "scraping historical odds");
        let games = page.scrape().await?;
        info!(year, games = games.len(), "parsed historical games");
        Ok(games)
    }

    /// Scrape a season and upload its CSV.
    ///
    /// The key depends only on the year, so re-runs overwrite.
    pub async fn scrape_and_upload(&self, year: i32) -> Result<SeasonUpload, ScrapeError> {
        let games = self.scrape_season(year).await?;
        let csv = to_csv(&games);

        let key = keys::season_csv_key(year);
        self.store.put(&key, &csv, "text/csv").await?;
        info!(year, games = games.len(), key, "uploaded season CSV");

        Ok(SeasonUpload {
            key,
            games: games.len(),
        })
    }

    /// Scrape and upload a list of years in order. A failed year is
    /// recorded and does not stop the batch.
    pub async fn scrape_years(&self, years: &[i32]) -> Vec<YearBatchEntry<SeasonUpload>> {
        let mut results = Vec::with_capacity(years.len());

        for &year in years {
            match self.scrape_and_upload(year).await {
                Ok(upload) => results.push(YearBatchEntry::ok(year, upload)),
                Err(e) => {
                    error!(year, error = %e, "failed to scrape/upload season");
                    results.push(YearBatchEntry::failed(year, e.to_string()));
                }
            }
        }

        results
    }

    /// Scrape a season and write its CSV to a local file instead of
    /// the object store.
    pub async fn save_csv_to_file(
        &self,
        year: i32,
        output: Option<&Path>,
    ) -> Result<PathBuf, ScrapeError> {
        let games = self.scrape_season(year).await?;
        let csv = to_csv(&games);

        let path = output.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::temp_dir().join(format!("{}_nfl_odds.csv", year))
        });
        std::fs::write(&path, csv)?;
        info!(year, games = games.len(), path = %path.display(), "CSV written");

        Ok(path)
    }

    /// Fetch a season page's raw HTML, for selector development.
    pub async fn dump_html(&self, year: i32) -> Result<String, ScrapeError> {
        let html = self.season(year).fetch_raw().await?;
        info!(year, chars = html.len(), "fetched raw season page");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_cells(texts: &[&str]) -> Vec<RowCell> {
        texts.iter().map(|t| RowCell::plain(*t)).collect()
    }

    #[test]
    fn test_short_row_skipped() {
        let cells = plain_cells(&["Sun", "Nov 10", "1:00PM", ""]);
        assert!(classify_and_map(&cells, 2024).is_none());
    }

    #[test]
    fn test_non_game_row_skipped() {
        let cells = plain_cells(&["Team", "W", "L", "T", "Pct", "PF", "PA"]);
        assert!(classify_and_map(&cells, 2024).is_none());
    }

    #[test]
    fn test_regular_season_mapping() {
        let cells = plain_cells(&[
            "Sun", "Nov 10", "1:00PM", "", "Chiefs", "27-24", "W -3", "", "Raiders", "O 45.5",
        ]);
        let game = classify_and_map(&cells, 2024).unwrap();
        assert_eq!(game.day, "Sun");
        assert_eq!(game.date, "Nov 10");
        assert_eq!(game.favorite, "Chiefs");
        assert_eq!(game.score, "27-24");
        assert_eq!(game.underdog, "Raiders");
        assert_eq!(game.over_under_result, "O 45.5");
        // Notes column absent on this row.
        assert_eq!(game.notes, "");
    }

    #[test]
    fn test_regular_season_notes_from_index_10() {
        let cells = plain_cells(&[
            "Sun", "Nov 10", "1:00PM", "", "Chiefs", "27-24", "W -3", "", "Raiders", "O 45.5",
            "OT",
        ]);
        let game = classify_and_map(&cells, 2024).unwrap();
        assert_eq!(game.notes, "OT");
    }

    #[test]
    fn test_playoff_mapping_shifts_by_one() {
        let cells = plain_cells(&[
            "AFC Wild Card",
            "Sun",
            "Jan 12",
            "4:30PM",
            "@",
            "Bills",
            "24-17",
            "W -2.5",
            "",
            "Dolphins",
            "U 41",
        ]);
        let game = classify_and_map(&cells, 2024).unwrap();
        assert_eq!(game.day, "Sun");
        assert_eq!(game.notes, "AFC Wild Card");
        assert_eq!(game.date, "Jan 12");
        assert_eq!(game.favorite_location, "@");
        assert_eq!(game.favorite, "Bills");
        assert_eq!(game.score, "24-17");
        assert_eq!(game.underdog, "Dolphins");
        assert_eq!(game.over_under_result, "U 41");
    }

    #[test]
    fn test_weekday_check_is_case_insensitive() {
        let cells = plain_cells(&["SUN", "Nov 10", "1:00PM", "", "Chiefs", "27-24"]);
        assert!(classify_and_map(&cells, 2024).is_some());
    }

    #[test]
    fn test_covered_flags_from_bold_cells() {
        let mut cells = plain_cells(&[
            "Sun", "Nov 10", "1:00PM", "", "Chiefs", "27-24", "W -3", "", "Raiders", "O 45.5",
        ]);
        cells[4] = RowCell::bold("Chiefs");
        let game = classify_and_map(&cells, 2024).unwrap();
        assert!(game.favorite_covered);
        assert!(!game.underdog_covered);
    }

    #[test]
    fn test_normalize_cell_text() {
        assert_eq!(normalize_cell_text("  Chiefs  "), "Chiefs");
        assert_eq!(normalize_cell_text("\u{a0}"), "");
        assert_eq!(normalize_cell_text("   "), "");
        assert_eq!(normalize_cell_text(""), "");
    }

    fn first_cell_bold(html: &str) -> bool {
        let document = Html::parse_document(html);
        let td_sel = Selector::parse("td").unwrap();
        let bold_sel = Selector::parse("b, strong").unwrap();
        let td = document.select(&td_sel).next().unwrap();
        element_is_bold(td, &bold_sel)
    }

    #[test]
    fn test_bold_detection_variants() {
        assert!(first_cell_bold(
            "<table><tbody><tr><td><b>Chiefs</b></td></tr></tbody></table>"
        ));
        assert!(first_cell_bold(
            "<table><tbody><tr><td><strong>Chiefs</strong></td></tr></tbody></table>"
        ));
        assert!(first_cell_bold(
            "<table><tbody><tr><td style=\"font-weight: bold\">Chiefs</td></tr></tbody></table>"
        ));
        assert!(first_cell_bold(
            "<table><tbody><tr><td style=\"font-weight:700\">Chiefs</td></tr></tbody></table>"
        ));
        assert!(first_cell_bold(
            "<table><tbody><tr><td class=\"text-Bold\">Chiefs</td></tr></tbody></table>"
        ));
        assert!(!first_cell_bold(
            "<table><tbody><tr><td>Chiefs</td></tr></tbody></table>"
        ));
    }

    #[test]
    fn test_extract_season_walks_all_bodies() {
        let html = r#"
            <table><tbody>
                <tr><td>Week 10</td></tr>
                <tr>
                    <td>Sun</td><td>Nov 10</td><td>1:00PM</td><td></td><td><b>Chiefs</b></td>
                    <td>27-24</td><td>W -3</td><td></td><td>Raiders</td><td>O 45.5</td><td></td>
                </tr>
            </tbody></table>
            <table><tbody>
                <tr>
                    <td>AFC Wild Card</td><td>Sun</td><td>Jan 12</td><td>4:30PM</td><td>@</td>
                    <td>Bills</td><td>24-17</td><td>W -2.5</td><td></td><td>Dolphins</td><td>U 41</td>
                </tr>
            </tbody></table>
        "#;
        let document = Html::parse_document(html);
        let games = extract_season(&document, 2024);

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].favorite, "Chiefs");
        assert!(games[0].favorite_covered);
        assert_eq!(games[1].notes, "AFC Wild Card");
        assert_eq!(games[1].score, "24-17");
    }

    /// Minimal parser for one CSV line, for round-trip checks.
    fn parse_csv_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;

        while let Some(c) = chars.next() {
            match c {
                '"' if !quoted && field.is_empty() => quoted = true,
                '"' if quoted => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        quoted = false;
                    }
                }
                ',' if !quoted => {
                    fields.push(std::mem::take(&mut field));
                }
                c => field.push(c),
            }
        }
        fields.push(field);
        fields
    }

    #[test]
    fn test_csv_round_trip_with_comma_and_quote() {
        let original = "Wild Card, \"delayed\" start";
        let line = format!("{},{}", escape_csv(original), escape_csv("plain"));
        let fields = parse_csv_line(&line);
        assert_eq!(fields, vec![original.to_string(), "plain".to_string()]);
    }

    #[test]
    fn test_to_csv_header_and_line() {
        let cells = plain_cells(&[
            "Sun", "Nov 10", "1:00PM", "", "Chiefs", "27-24", "W -3", "", "Raiders", "O 45.5",
        ]);
        let game = classify_and_map(&cells, 2024).unwrap();
        let csv = to_csv(&[game]);
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Year,Day,Date,Time,FavoriteLocation,Favorite,Score,SpreadResult,UnderdogLocation,Underdog,OverUnderResult,Notes,FavoriteCovered,UnderdogCovered,CoveredBy"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024,Sun,Nov 10,1:00PM,,Chiefs,27-24,W -3,,Raiders,O 45.5,,false,false,Unknown"
        );
        assert!(csv.ends_with('\n'));
    }
}
