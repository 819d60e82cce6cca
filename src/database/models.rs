use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::{PlayerStats, Stage};

/// Lifecycle of a tournament import or a match result scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    InProgress,
    Completed,
    Failed,
}

impl ImportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportStatus::InProgress => "in_progress",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in_progress" => Some(ImportStatus::InProgress),
            "completed" => Some(ImportStatus::Completed),
            "failed" => Some(ImportStatus::Failed),
            _ => None,
        }
    }

    /// Tournament status derived from its match statuses.
    /// Any failure wins, then all-completed, otherwise still in progress.
    /// `None` when there are no matches to derive from.
    pub fn aggregate(statuses: &[Option<ImportStatus>]) -> Option<ImportStatus> {
        if statuses.is_empty() {
            return None;
        }

        if statuses.contains(&Some(ImportStatus::Failed)) {
            Some(ImportStatus::Failed)
        } else if statuses.iter().all(|s| *s == Some(ImportStatus::Completed)) {
            Some(ImportStatus::Completed)
        } else {
            Some(ImportStatus::InProgress)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tournament {
    pub id: i64,
    pub external_id: String,
    pub title: String,
    pub date: NaiveDate,
    pub link: String,
    pub import_status: Option<ImportStatus>,
    pub import_error: Option<String>,
    pub matches_saved: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Match {
    pub id: i64,
    pub tournament_id: i64,
    pub external_id: String,
    pub stage: Stage,
    pub round: String,
    pub match_type: String,
    pub player_name: String,
    pub player_code: String,
    pub opponent_name: String,
    pub opponent_code: String,
    pub link: String,
    pub result_status: Option<ImportStatus>,
    pub result_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlayerResult {
    pub id: i64,
    pub match_id: i64,
    pub player_identifier: String,
    pub player_code: String,
    pub stats: PlayerStats,
    pub updated_at: Option<NaiveDateTime>,
}

/// Where a nickname lookup searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupScope {
    Tournament(i64),
    Global,
}

// Counts reported by a batch match insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchBatchOutcome {
    pub scraped: usize,
    pub inserted: usize,
    pub stored: usize,
}

impl MatchBatchOutcome {
    pub fn fully_saved(&self) -> bool {
        self.stored >= self.scraped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ImportStatus::*;

    #[test]
    fn test_aggregate_prefers_failure() {
        assert_eq!(
            ImportStatus::aggregate(&[Some(Completed), Some(Completed), Some(Failed)]),
            Some(Failed)
        );
    }

    #[test]
    fn test_aggregate_requires_every_match() {
        assert_eq!(ImportStatus::aggregate(&[Some(Completed), Some(Completed)]), Some(Completed));
        assert_eq!(ImportStatus::aggregate(&[Some(Completed), None]), Some(InProgress));
        assert_eq!(ImportStatus::aggregate(&[Some(InProgress)]), Some(InProgress));
        assert_eq!(ImportStatus::aggregate(&[]), None);
    }

    #[test]
    fn test_status_text_round_trip() {
        for status in [InProgress, Completed, Failed] {
            assert_eq!(ImportStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ImportStatus::parse("pending"), None);
    }
}
