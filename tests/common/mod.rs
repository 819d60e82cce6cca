#![allow(dead_code)]

use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use darts_sync::browser::{FrameTarget, PageLoader, ResponseCollector};
use darts_sync::config::AppConfig;
use darts_sync::database::ImportStore;
use darts_sync::errors::ScrapeError;
use darts_sync::services::SyncOrchestrator;

pub const BASE_URL: &str = "https://darts.test/n01/tournament";

pub fn event_url(tournament_id: &str) -> String {
    format!("{BASE_URL}/comp.php?id={tournament_id}")
}

pub fn match_url(tournament_id: &str, round: u32, first: &str, second: &str) -> String {
    format!("https://darts.test/match/{tournament_id}/{round}/{first}-{second}")
}

#[derive(Debug, Clone)]
pub enum FrameReply {
    Html(String),
    Timeout,
    Broken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    Search(String),
    Document(String),
    Frame(String),
}

#[derive(Default)]
struct Site {
    search_items: Vec<Value>,
    search_down: bool,
    documents: HashMap<String, String>,
    frames: HashMap<String, VecDeque<FrameReply>>,
    visits: Vec<(Visit, Instant)>,
}

/// Scripted stand-in for the browser; clones share one site
#[derive(Clone, Default)]
pub struct FakeLoader {
    site: Arc<Mutex<Site>>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_down(&self) {
        self.site.lock().unwrap().search_down = true;
    }

    /// Completed tournament listed by the search page, dated `days_ago` days back
    pub fn add_tournament(&self, id: &str, title: &str, days_ago: i64, page: String) {
        let date = (Utc::now() - Duration::days(days_ago)).format("%Y-%m-%d").to_string();
        let mut site = self.site.lock().unwrap();
        site.search_items
            .push(json!({ "id": id, "title": title, "date": date, "status": 40 }));
        site.documents.insert(event_url(id), page);
    }

    /// Replies served in order; the last one repeats
    pub fn script_frame(&self, url: &str, replies: Vec<FrameReply>) {
        self.site
            .lock()
            .unwrap()
            .frames
            .insert(url.to_string(), replies.into());
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.site
            .lock()
            .unwrap()
            .visits
            .iter()
            .map(|(visit, _)| visit.clone())
            .collect()
    }

    pub fn documents_loaded(&self) -> Vec<String> {
        self.visits()
            .into_iter()
            .filter_map(|visit| match visit {
                Visit::Document(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn frame_attempts(&self, url: &str) -> Vec<Instant> {
        self.site
            .lock()
            .unwrap()
            .visits
            .iter()
            .filter(|(visit, _)| *visit == Visit::Frame(url.to_string()))
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn clear_visits(&self) {
        self.site.lock().unwrap().visits.clear();
    }

    fn record(&self, visit: Visit) {
        self.site.lock().unwrap().visits.push((visit, Instant::now()));
    }
}

impl PageLoader for FakeLoader {
    async fn intercept_json(&self, url: &str, fragment: &str) -> Result<ResponseCollector> {
        self.record(Visit::Search(url.to_string()));
        let site = self.site.lock().unwrap();

        if site.search_down {
            return Err(ScrapeError::Navigation(format!("{url} unreachable")).into());
        }

        let mut collector = ResponseCollector::new();
        if !site.search_items.is_empty() {
            collector.push(
                format!("https://darts.test/{fragment}?page=1"),
                json!({ "data": site.search_items }),
            );
        }
        Ok(collector)
    }

    async fn document_html(&self, url: &str) -> Result<String> {
        self.record(Visit::Document(url.to_string()));
        let site = self.site.lock().unwrap();

        site.documents
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Navigation(format!("{url} returned 404")).into())
    }

    async fn frame_html(&self, url: &str, _frame: &FrameTarget) -> Result<String> {
        self.record(Visit::Frame(url.to_string()));
        let mut site = self.site.lock().unwrap();

        let Some(replies) = site.frames.get_mut(url) else {
            return Err(ScrapeError::ElementNotFound(format!("no statistics tab on {url}")).into());
        };
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };

        match reply {
            Some(FrameReply::Html(html)) => Ok(html),
            Some(FrameReply::Timeout) => {
                Err(ScrapeError::Timeout(format!("statistics cell on {url} never filled")).into())
            }
            Some(FrameReply::Broken) | None => Ok("<html><body>under maintenance</body></html>".to_string()),
        }
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::new();
    config.scraper.base_url = BASE_URL.to_string();
    config
}

pub fn orchestrator(loader: &FakeLoader) -> SyncOrchestrator<FakeLoader> {
    let store = ImportStore::in_memory().unwrap();
    SyncOrchestrator::new(loader.clone(), store, &test_config())
}

/// Played group fixture, rendered once per side like the real page
pub fn group_fixture(tournament_id: &str, round: u32, first: &str, second: &str) -> String {
    let link = match_url(tournament_id, round, first, second);
    format!(
        r#"<tr><td data-stage="rr" data-round="{round}" data-p1="{first}" data-p2="{second}"><span class="avg">50.00</span><a href="{link}">score</a></td></tr>
<tr><td data-stage="rr" data-round="{round}" data-p1="{second}" data-p2="{first}"><span class="avg">45.00</span><a href="{link}">score</a></td></tr>"#
    )
}

/// Group fixture not played yet
pub fn placeholder_fixture(round: u32, first: &str, second: &str) -> String {
    format!(
        r#"<tr><td data-stage="rr" data-round="{round}" data-p1="{first}" data-p2="{second}"><span class="avg" hidden></span></td></tr>"#
    )
}

pub fn knockout_fixture(tournament_id: &str, round: u32, first: &str, second: &str, subtitle: &str) -> String {
    let link = match_url(tournament_id, round, first, second);
    format!(
        r#"<div data-stage="t" data-round="{round}" data-p1="{first}" data-p2="{second}"><span class="subtitle">{subtitle}</span><a href="{link}">open</a></div>"#
    )
}

pub fn event_page(roster: &[(&str, &str)], fixtures: &[String]) -> String {
    let entries: String = roster
        .iter()
        .map(|(code, name)| format!(r#"<li data-player-code="{code}"><span class="player_name">{name}</span></li>"#))
        .collect();

    format!(
        "<html><body><ul>{entries}</ul><table>{}</table></body></html>",
        fixtures.join("\n")
    )
}

pub fn stats_frame(first: (&str, i64, f64), second: (&str, i64, f64)) -> String {
    format!(
        r#"<html><body><table>
<tr><th class="p1" data-code="{c1}"></th><th class="p2" data-code="{c2}"></th></tr>
<tr data-stat="legs"><td class="p1">{l1}</td><td class="p2">{l2}</td></tr>
<tr data-stat="average"><td class="p1">{a1:.2}</td><td class="p2">{a2:.2}</td></tr>
<tr data-stat="checkout"><td class="p1">25.0%<br>(3 / 12)</td><td class="p2">-%<br>(0 / 5)</td></tr>
<tr data-stat="60"><td class="p1">4</td><td class="p2">3</td></tr>
<tr data-stat="80"><td class="p1">2</td><td class="p2"></td></tr>
<tr data-stat="180"><td class="p1">1</td><td class="p2">0</td></tr>
</table></body></html>"#,
        c1 = first.0,
        l1 = first.1,
        a1 = first.2,
        c2 = second.0,
        l2 = second.1,
        a2 = second.2,
    )
}
