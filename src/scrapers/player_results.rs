use anyhow::Result;
use log::info;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::element_text;
use crate::browser::{FrameTarget, PageLoader};
use crate::domain::{MatchKey, PlayerStats, ScrapedPlayerResult};
use crate::errors::{is_timeout, ScrapeError};
use crate::retry::RetryPolicy;

/// Statistics tab of a match page; its table lives in an iframe
pub const STATS_VIEW: FrameTarget = FrameTarget {
    tab_selector: "[data-tab='stats']",
    frame_selector: "iframe.stats_frame",
    ready_selector: "[data-stat='average'] .p1",
};

static STAT_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-stat]").expect("valid stat row selector"));
static FIRST_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".p1").expect("valid cell selector"));
static SECOND_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".p2").expect("valid cell selector"));
static FIRST_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th.p1[data-code]").expect("valid header selector"));
static SECOND_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th.p2[data-code]").expect("valid header selector"));

static PERCENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:[.,]\d+)?)\s*%").expect("valid percent regex"));
static CHECKOUT_HITS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(\d+)\s*/\s*\d+\s*\)").expect("valid checkout regex"));
static DECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d+(?:[.,]\d+)?)").expect("valid decimal regex"));
static COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("valid count regex"));

/// Reads per-player statistics of one match
pub struct PlayerResultScraper {
    retry: RetryPolicy,
}

impl PlayerResultScraper {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Two result rows, one per side. Timeouts are retried per the policy;
    /// anything else means the page changed and fails at once.
    pub async fn scrape<L: PageLoader>(
        &self,
        loader: &L,
        link: &str,
        key: &MatchKey,
    ) -> Result<[ScrapedPlayerResult; 2]> {
        let match_id = key.match_id();
        info!("Scraping statistics of match {}", match_id);

        self.retry
            .run(
                &format!("Statistics of {}", match_id),
                move || async move {
                    let html = loader.frame_html(link, &STATS_VIEW).await?;
                    anyhow::Ok(parse_stats_document(&html, key)?)
                },
                is_timeout,
            )
            .await
    }
}

/// Build both result rows from the statistics frame document
pub fn parse_stats_document(html: &str, key: &MatchKey) -> Result<[ScrapedPlayerResult; 2], ScrapeError> {
    let document = Html::parse_document(html);

    let rows: HashMap<String, ElementRef> = document
        .select(&STAT_ROW)
        .filter_map(|row| {
            row.value()
                .attr("data-stat")
                .map(|name| (name.trim().to_string(), row))
        })
        .collect();

    if rows.is_empty() {
        return Err(ScrapeError::Structure("statistics table has no rows".to_string()));
    }

    let (first_code, second_code) = side_codes(&document, key);
    let first = RawSide::read(&rows, &FIRST_CELL);
    let second = RawSide::read(&rows, &SECOND_CELL);

    Ok([
        first.to_result(key, &first_code, second.legs),
        second.to_result(key, &second_code, first.legs),
    ])
}

/// Codes of the two columns; header codes when they agree with the match id,
/// otherwise the id's sorted order
fn side_codes(document: &Html, key: &MatchKey) -> (String, String) {
    let header = |selector: &Selector| {
        document
            .select(selector)
            .next()
            .and_then(|th| th.value().attr("data-code"))
            .map(|code| code.trim().to_string())
    };

    match (header(&FIRST_HEADER), header(&SECOND_HEADER)) {
        (Some(first), Some(second))
            if first != second && key.contains_code(&first) && key.contains_code(&second) =>
        {
            (first, second)
        }
        _ => (key.code_lo.clone(), key.code_hi.clone()),
    }
}

/// Values of one column as rendered, before bracket merging
#[derive(Debug, Default)]
struct RawSide {
    legs: Option<i64>,
    average: Option<f64>,
    first_nine: Option<f64>,
    checkout: Option<String>,
    raw_60: Option<i64>,
    raw_80: Option<i64>,
    raw_100: Option<i64>,
    raw_120: Option<i64>,
    raw_140: Option<i64>,
    raw_170: Option<i64>,
    raw_180: Option<i64>,
    high_finish: Option<i64>,
    best_leg: Option<i64>,
    worst_leg: Option<i64>,
}

impl RawSide {
    fn read(rows: &HashMap<String, ElementRef>, side: &Selector) -> Self {
        let cell = |name: &str| rows.get(name).and_then(|row| row.select(side).next());
        let text = |name: &str| cell(name).map(|c| element_text(&c));
        let count = |name: &str| text(name).as_deref().and_then(parse_count);
        let decimal = |name: &str| text(name).as_deref().and_then(parse_decimal);

        Self {
            legs: count("legs"),
            average: decimal("average"),
            first_nine: decimal("first9"),
            checkout: cell("checkout").map(|c| c.inner_html()),
            raw_60: count("60"),
            raw_80: count("80"),
            raw_100: count("100"),
            raw_120: count("120"),
            raw_140: count("140"),
            raw_170: count("170"),
            raw_180: count("180"),
            high_finish: count("high_finish"),
            best_leg: count("best_leg"),
            worst_leg: count("worst_leg"),
        }
    }

    fn to_result(&self, key: &MatchKey, code: &str, opponent_legs: Option<i64>) -> ScrapedPlayerResult {
        let checkout = self.checkout.as_deref().unwrap_or_default();

        ScrapedPlayerResult {
            player_identifier: key.player_identifier(code),
            player_code: code.to_string(),
            stats: PlayerStats {
                average: self.average,
                first_nine_average: self.first_nine,
                checkout_percentage: parse_checkout_percentage(checkout),
                checkout_hits: parse_checkout_hits(checkout),
                score_60_count: merge_brackets(self.raw_60, self.raw_80),
                score_100_count: merge_brackets(self.raw_100, self.raw_120),
                score_140_count: merge_brackets(self.raw_140, self.raw_170),
                score_180_count: self.raw_180,
                high_finish: self.high_finish,
                best_leg: self.best_leg,
                worst_leg: self.worst_leg,
                legs_won: self.legs,
                legs_lost: opponent_legs,
            },
        }
    }
}

/// Leading number before `%` in `"<pct>%<br>(<made> / <attempts>)"`
pub fn parse_checkout_percentage(raw: &str) -> Option<f64> {
    PERCENT_REGEX
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse().ok())
}

/// `<made>` from the parenthesised part of the checkout string
pub fn parse_checkout_hits(raw: &str) -> Option<i64> {
    CHECKOUT_HITS_REGEX
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Sum of two adjacent scoring brackets; a single missing side counts as zero
pub fn merge_brackets(low: Option<i64>, high: Option<i64>) -> Option<i64> {
    match (low, high) {
        (None, None) => None,
        (low, high) => Some(low.unwrap_or(0) + high.unwrap_or(0)),
    }
}

fn parse_decimal(text: &str) -> Option<f64> {
    DECIMAL_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse().ok())
}

fn parse_count(text: &str) -> Option<i64> {
    COUNT_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_FRAME: &str = r#"
        <html><body><table id="stats">
          <tr><th></th><th class="p1" data-code="now02">Jan Nowak</th><th class="p2" data-code="kow01">Mirek Kowalski</th></tr>
          <tr data-stat="legs"><td class="p1">1</td><td class="p2">3</td></tr>
          <tr data-stat="average"><td class="p1">48.12</td><td class="p2">55.90</td></tr>
          <tr data-stat="first9"><td class="p1">52.00</td><td class="p2">61.33</td></tr>
          <tr data-stat="checkout"><td class="p1">-%<br>(0 / 4)</td><td class="p2">15.0%<br>(3 / 20)</td></tr>
          <tr data-stat="60"><td class="p1">4</td><td class="p2">7</td></tr>
          <tr data-stat="80"><td class="p1">2</td><td class="p2">1</td></tr>
          <tr data-stat="100"><td class="p1">3</td><td class="p2">5</td></tr>
          <tr data-stat="120"><td class="p1">0</td><td class="p2">2</td></tr>
          <tr data-stat="140"><td class="p1">1</td><td class="p2">2</td></tr>
          <tr data-stat="170"><td class="p1">0</td><td class="p2">1</td></tr>
          <tr data-stat="180"><td class="p1">0</td><td class="p2">1</td></tr>
          <tr data-stat="high_finish"><td class="p1"></td><td class="p2">96</td></tr>
          <tr data-stat="best_leg"><td class="p1">27</td><td class="p2">18</td></tr>
          <tr data-stat="worst_leg"><td class="p1">33</td><td class="p2">30</td></tr>
        </table></body></html>
    "#;

    fn key() -> MatchKey {
        MatchKey::parse("t77_rr_1_kow01_now02").unwrap()
    }

    #[test]
    fn test_checkout_percentage() {
        assert_eq!(parse_checkout_percentage("15.0%<br>(3 / 20)"), Some(15.0));
        assert_eq!(parse_checkout_percentage("33,3% (1 / 3)"), Some(33.3));
        assert_eq!(parse_checkout_percentage("-%<br>(0 / 4)"), None);
        assert_eq!(parse_checkout_percentage(""), None);
    }

    #[test]
    fn test_checkout_hits() {
        assert_eq!(parse_checkout_hits("15.0%<br>(3 / 20)"), Some(3));
        assert_eq!(parse_checkout_hits("15.0%"), None);
    }

    #[test]
    fn test_bracket_merge() {
        assert_eq!(merge_brackets(Some(4), Some(2)), Some(6));
        assert_eq!(merge_brackets(Some(1), Some(0)), Some(1));
        assert_eq!(merge_brackets(None, Some(2)), Some(2));
        assert_eq!(merge_brackets(None, None), None);
    }

    #[test]
    fn test_parse_stats_document_maps_sides_by_header() {
        let [first, second] = parse_stats_document(STATS_FRAME, &key()).unwrap();

        assert_eq!(first.player_code, "now02");
        assert_eq!(first.player_identifier, "t77_rr_1_now02");
        assert_eq!(first.stats.legs_won, Some(1));
        assert_eq!(first.stats.legs_lost, Some(3));
        assert_eq!(first.stats.checkout_percentage, None);
        assert_eq!(first.stats.checkout_hits, Some(0));
        assert_eq!(first.stats.score_60_count, Some(6));
        assert_eq!(first.stats.score_140_count, Some(1));
        assert_eq!(first.stats.high_finish, None);

        assert_eq!(second.player_code, "kow01");
        assert_eq!(second.stats.average, Some(55.9));
        assert_eq!(second.stats.first_nine_average, Some(61.33));
        assert_eq!(second.stats.checkout_percentage, Some(15.0));
        assert_eq!(second.stats.checkout_hits, Some(3));
        assert_eq!(second.stats.score_100_count, Some(7));
        assert_eq!(second.stats.score_140_count, Some(3));
        assert_eq!(second.stats.score_180_count, Some(1));
        assert_eq!(second.stats.best_leg, Some(18));
        assert_eq!(second.stats.worst_leg, Some(30));
    }

    #[test]
    fn test_missing_headers_fall_back_to_sorted_codes() {
        let html = r#"<table><tr data-stat="legs"><td class="p1">2</td><td class="p2">0</td></tr></table>"#;
        let [first, second] = parse_stats_document(html, &key()).unwrap();
        assert_eq!(first.player_code, "kow01");
        assert_eq!(second.player_code, "now02");
        assert_eq!(second.stats.legs_lost, Some(2));
    }

    #[test]
    fn test_empty_frame_is_structural() {
        let err = parse_stats_document("<html><body>maintenance</body></html>", &key()).unwrap_err();
        assert!(!err.is_timeout());
    }
}
