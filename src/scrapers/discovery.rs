use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashSet;

use super::resolve_link;
use crate::browser::{PageLoader, ResponseCollector};
use crate::config::ScraperSettings;
use crate::domain::DiscoveredTournament;
use crate::errors::parse_context;

/// Finds completed events for a keyword by reading the search page's own data calls
pub struct TournamentDiscovery {
    settings: ScraperSettings,
}

impl TournamentDiscovery {
    pub fn new(settings: ScraperSettings) -> Self {
        Self { settings }
    }

    pub async fn discover<L: PageLoader>(
        &self,
        loader: &L,
        keyword: &str,
    ) -> Result<Vec<DiscoveredTournament>> {
        info!("Discovering tournaments for keyword: {}", keyword);

        let url = self.build_search_url(keyword);
        let collector = loader
            .intercept_json(&url, &self.settings.search_data_fragment)
            .await?;

        if collector.is_empty() {
            info!("  → No search responses intercepted, nothing to import");
            return Ok(Vec::new());
        }

        let tournaments = self.select_completed(&collector, Utc::now());
        info!(
            "  → Found {} completed tournaments in {} responses",
            tournaments.len(),
            collector.len()
        );
        Ok(tournaments)
    }

    /// Completed events dated strictly before `now` and inside the trailing window,
    /// in intercept order without repeats
    pub fn select_completed(
        &self,
        collector: &ResponseCollector,
        now: DateTime<Utc>,
    ) -> Vec<DiscoveredTournament> {
        let now = now.naive_utc();
        let window_start = now - Duration::days(self.settings.discovery_window_days);
        let mut seen = HashSet::new();
        let mut tournaments = Vec::new();

        for response in collector.responses() {
            for item in extract_items(&response.body) {
                let Some((tournament, starts_at)) = self.parse_item(item) else {
                    continue;
                };

                if starts_at >= now || starts_at < window_start {
                    debug!("Skipping {} dated {} outside window", tournament.external_id, starts_at);
                    continue;
                }

                if seen.insert(tournament.external_id.clone()) {
                    tournaments.push(tournament);
                }
            }
        }

        tournaments
    }

    fn parse_item(&self, item: &Value) -> Option<(DiscoveredTournament, NaiveDateTime)> {
        let external_id = value_as_string(item.get("id")?)?;

        let status = item.get("status").and_then(value_as_string);
        if status.as_deref() != Some(self.settings.completed_status.as_str()) {
            return None;
        }

        let Some(starts_at) = item.get("date").and_then(parse_event_date) else {
            warn!("{} for tournament {}", parse_context("event date"), external_id);
            return None;
        };

        let title = item
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let link = match item.get("url").and_then(Value::as_str) {
            Some(href) if !href.trim().is_empty() => {
                resolve_link(&format!("{}/", self.settings.base_url), href)
            }
            _ => self.build_event_url(&external_id),
        };

        Some((
            DiscoveredTournament {
                external_id,
                title,
                link,
                date: starts_at.date(),
            },
            starts_at,
        ))
    }

    // --- URL Building ---

    fn build_search_url(&self, keyword: &str) -> String {
        format!(
            "{}{}?keyword={}",
            self.settings.base_url,
            self.settings.search_path,
            urlencoding::encode(keyword)
        )
    }

    fn build_event_url(&self, external_id: &str) -> String {
        format!(
            "{}{}{}",
            self.settings.base_url,
            self.settings.event_path,
            urlencoding::encode(external_id)
        )
    }
}

/// Items of one paginated payload: a bare array or an object wrapping one
fn extract_items(body: &Value) -> &[Value] {
    if let Some(items) = body.as_array() {
        return items;
    }

    ["data", "items", "list"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts unix seconds or the textual formats the site has been seen to use
pub fn parse_event_date(value: &Value) -> Option<NaiveDateTime> {
    if let Some(secs) = value.as_i64() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }

    let text = value.as_str()?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    if let Ok(secs) = text.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }

    None
}
