use anyhow::{Context, Result};
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};
use tokio::task;

use super::{element_text, resolve_link};
use crate::browser::PageLoader;
use crate::domain::{canonical_match_id, tournament_id_from_link, MatchSide, ScrapedMatch, Stage};
use crate::errors::ScrapeError;

static MATCH_CANDIDATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-stage]").expect("valid candidate selector"));
static ROSTER_ENTRY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-player-code]").expect("valid roster selector"));
static ROSTER_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".player_name").expect("valid roster name selector"));
static SUBTITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".subtitle").expect("valid subtitle selector"));
static AVERAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".avg").expect("valid average selector"));
static MATCH_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static FIRST_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".p1_name").expect("valid name selector"));
static SECOND_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".p2_name").expect("valid name selector"));

/// Event page the passes run against
#[derive(Debug, Clone)]
pub struct PageContext {
    pub tournament_id: String,
    pub page_url: String,
}

/// Result of one stage pass; `candidates` counts every element carrying the
/// stage tag, placeholders included
#[derive(Debug, Default)]
pub struct StagePass {
    pub matches: Vec<ScrapedMatch>,
    pub candidates: usize,
}

/// Reads both bracket stages of one event page
#[derive(Debug, Default)]
pub struct MatchListScraper;

impl MatchListScraper {
    pub fn new() -> Self {
        Self
    }

    pub async fn scrape<L: PageLoader>(&self, loader: &L, link: &str) -> Result<Vec<ScrapedMatch>> {
        let tournament_id = tournament_id_from_link(link)
            .ok_or_else(|| ScrapeError::Structure(format!("no tournament id in link {link}")))?;
        info!("Scraping match list of tournament {}", tournament_id);

        let html: Arc<str> = loader.document_html(link).await?.into();
        let ctx = Arc::new(PageContext {
            tournament_id,
            page_url: link.to_string(),
        });

        let (group, knockout) = tokio::try_join!(
            run_pass(Arc::clone(&html), Arc::clone(&ctx), Stage::Group),
            run_pass(html, ctx, Stage::Knockout),
        )?;

        if group.candidates + knockout.candidates == 0 {
            return Err(ScrapeError::Structure(format!("no match elements on {link}")).into());
        }

        info!(
            "  → {} group and {} knockout matches",
            group.matches.len(),
            knockout.matches.len()
        );

        let mut matches = group.matches;
        matches.extend(knockout.matches);
        Ok(matches)
    }
}

async fn run_pass(html: Arc<str>, ctx: Arc<PageContext>, stage: Stage) -> Result<StagePass> {
    task::spawn_blocking(move || extract_stage(&html, &ctx, stage))
        .await
        .with_context(|| format!("{} extraction task panicked", stage.as_str()))
}

/// Extract one stage's fixtures. Group fixtures render once per side, so a
/// seen-set keyed by canonical id collapses them.
pub fn extract_stage(html: &str, ctx: &PageContext, stage: Stage) -> StagePass {
    let document = Html::parse_document(html);
    let roster = read_roster(&document);
    let mut seen = HashSet::new();
    let mut pass = StagePass::default();

    for element in document.select(&MATCH_CANDIDATE) {
        if element.value().attr("data-stage").map(str::trim) != Some(stage.tag()) {
            continue;
        }
        pass.candidates += 1;

        let Some(scraped) = build_match(&element, ctx, stage, &roster) else {
            continue;
        };

        if seen.insert(scraped.external_id.clone()) {
            pass.matches.push(scraped);
        }
    }

    pass
}

fn build_match(
    element: &ElementRef,
    ctx: &PageContext,
    stage: Stage,
    roster: &HashMap<String, String>,
) -> Option<ScrapedMatch> {
    let round = attr_text(element, "data-round");
    let first_code = attr_text(element, "data-p1");
    let second_code = attr_text(element, "data-p2");

    let (Some(round), Some(first_code), Some(second_code)) = (round, first_code, second_code) else {
        debug!("Skipping {} candidate without round or player codes", stage.as_str());
        return None;
    };

    if stage == Stage::Group && !has_visible_average(element) {
        debug!("Skipping unplayed group fixture {} vs {}", first_code, second_code);
        return None;
    }

    let subtitle = element
        .select(&SUBTITLE)
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty());

    let (first_name, second_name) = match stage {
        Stage::Group => (
            roster_name(roster, &first_code),
            roster_name(roster, &second_code),
        ),
        Stage::Knockout => (
            inline_name(element, &FIRST_NAME).unwrap_or_else(|| roster_name(roster, &first_code)),
            inline_name(element, &SECOND_NAME).unwrap_or_else(|| roster_name(roster, &second_code)),
        ),
    };

    let link = element
        .select(&MATCH_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve_link(&ctx.page_url, href))
        .unwrap_or_else(|| ctx.page_url.clone());

    Some(ScrapedMatch {
        external_id: canonical_match_id(&ctx.tournament_id, stage, &round, &first_code, &second_code),
        stage,
        match_type: match_type_label(stage, subtitle.as_deref()),
        round,
        player: MatchSide {
            name: first_name,
            code: first_code,
        },
        opponent: MatchSide {
            name: second_name,
            code: second_code,
        },
        link,
    })
}

/// `round_robin` for group fixtures, `knockout_<subtitle>` otherwise
pub fn match_type_label(stage: Stage, subtitle: Option<&str>) -> String {
    match stage {
        Stage::Group => "round_robin".to_string(),
        Stage::Knockout => {
            let normalized = subtitle
                .map(|s| s.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_"))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            format!("knockout_{}", normalized)
        }
    }
}

fn read_roster(document: &Html) -> HashMap<String, String> {
    let mut roster = HashMap::new();

    for entry in document.select(&ROSTER_ENTRY) {
        let Some(code) = attr_text(&entry, "data-player-code") else {
            continue;
        };
        let name = entry
            .select(&ROSTER_NAME)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_else(|| element_text(&entry));
        if !name.is_empty() {
            roster.entry(code).or_insert(name);
        }
    }

    roster
}

fn roster_name(roster: &HashMap<String, String>, code: &str) -> String {
    roster.get(code).cloned().unwrap_or_else(|| code.to_string())
}

fn inline_name(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|name| !name.is_empty())
}

fn attr_text(element: &ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn has_visible_average(element: &ElementRef) -> bool {
    element
        .select(&AVERAGE)
        .any(|avg| !is_hidden(&avg) && !element_text(&avg).is_empty())
}

fn is_hidden(element: &ElementRef) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    if value.classes().any(|class| class == "hidden") {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        let style: String = style.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}
