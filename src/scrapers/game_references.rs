//! Game-reference extraction from archived week pages.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::models::{GameReference, MIN_GAME_ID_LEN};

/// Path segment identifying boxscore links.
pub const BOXSCORE_MARKER: &str = "/boxscores/";

/// File extension of boxscore pages.
pub const BOXSCORE_EXT: &str = ".htm";

/// Extract deduplicated game references from a week page.
///
/// A page commonly links the same game from several contexts (score
/// cell, team-name cell); the first occurrence of an identifier wins
/// and output follows document order of first occurrence. A link that
/// fails decomposition is logged and skipped, never fatal to the page.
pub fn extract_references(html: &str, year: i32, week: u32) -> Vec<GameReference> {
    let document = Html::parse_document(html);
    let anchor_sel =
        Selector::parse(&format!(r#"a[href*="{}"]"#, BOXSCORE_MARKER)).unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut references = Vec::new();

    for link in document.select(&anchor_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.ends_with(BOXSCORE_EXT) {
            continue;
        }

        let game_id = GameReference::game_id_from_path(href);
        if game_id.len() < MIN_GAME_ID_LEN {
            continue;
        }
        if !seen.insert(game_id.to_string()) {
            continue;
        }

        match GameReference::from_boxscore_path(href, year, week) {
            Ok(reference) => references.push(reference),
            Err(e) => warn!(href, error = %e, "failed to parse boxscore link"),
        }
    }

    debug!(year, week, count = references.len(), "parsed game references");
    references
}

/// Serialize references to CSV: header plus one line per reference,
/// newline-joined without a trailing newline.
pub fn references_to_csv(references: &[GameReference]) -> String {
    let mut lines = Vec::with_capacity(references.len() + 1);
    lines.push(GameReference::CSV_HEADER.to_string());
    lines.extend(references.iter().map(GameReference::to_csv_line));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <td><a href="/boxscores/202409050kan.htm">Final</a></td>
            <td><a href="/boxscores/202409080phi.htm">Final</a></td>
            <td><a href="/boxscores/202409050kan.htm">Chiefs</a></td>
            <td><a href="/boxscores/short.htm">bad</a></td>
            <td><a href="/boxscores/202409080phi.pdf">not a page</a></td>
            <td><a href="/teams/kan/2024.htm">Chiefs season</a></td>
        </body></html>
    "#;

    #[test]
    fn test_extract_dedupes_first_occurrence_wins() {
        let refs = extract_references(PAGE, 2024, 1);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].game_id, "202409050kan");
        assert_eq!(refs[1].game_id, "202409080phi");
    }

    #[test]
    fn test_extract_skips_short_and_foreign_links() {
        let refs = extract_references(PAGE, 2024, 1);
        assert!(refs.iter().all(|r| r.boxscore_path.contains(BOXSCORE_MARKER)));
        assert!(refs.iter().all(|r| r.game_id.len() >= MIN_GAME_ID_LEN));
    }

    #[test]
    fn test_extract_empty_page() {
        assert!(extract_references("<html></html>", 2024, 1).is_empty());
    }

    #[test]
    fn test_references_to_csv() {
        let refs = extract_references(PAGE, 2024, 1);
        let csv = references_to_csv(&refs);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "GameId,Year,Week,GameDate,HomeTeamCode,BoxscoreUrl");
        assert_eq!(
            lines[1],
            "202409050kan,2024,1,2024-09-05,kan,/boxscores/202409050kan.htm"
        );
        assert_eq!(lines.len(), 3);
        assert!(!csv.ends_with('\n'));
    }
}
