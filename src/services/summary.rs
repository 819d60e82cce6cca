use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::ImportStatus;
use crate::domain::PlayerMatchRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentAction {
    Inserted,
    Updated,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentOutcome {
    pub external_id: String,
    pub title: String,
    pub action: TournamentAction,
    pub status: Option<ImportStatus>,
}

/// Match and result counts for one tournament of a sync run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchImportStats {
    pub scraped: usize,
    pub inserted: usize,
    pub stored: usize,
    pub results_completed: usize,
    pub results_failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub total_processed: usize,
    pub actions: Vec<TournamentOutcome>,
    pub match_stats: BTreeMap<String, MatchImportStats>,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: TournamentOutcome, stats: Option<MatchImportStats>) {
        match outcome.action {
            TournamentAction::Inserted => self.inserted += 1,
            TournamentAction::Updated => self.updated += 1,
            TournamentAction::Skipped => self.skipped += 1,
        }
        self.total_processed += 1;

        if let Some(stats) = stats {
            self.match_stats.insert(outcome.external_id.clone(), stats);
        }
        self.actions.push(outcome);
    }

    pub fn print(&self) {
        println!("{}", "Sync finished".bold());
        println!(
            "  {} inserted, {} updated, {} skipped ({} processed)",
            self.inserted.to_string().green(),
            self.updated.to_string().yellow(),
            self.skipped.to_string().dimmed(),
            self.total_processed
        );

        for outcome in &self.actions {
            let status = outcome.status.map(ImportStatus::as_str).unwrap_or("-");
            let status = match outcome.status {
                Some(ImportStatus::Completed) => status.green(),
                Some(ImportStatus::Failed) => status.red(),
                _ => status.yellow(),
            };
            print!("  {:<12} {:<10} {}", outcome.external_id, status, outcome.title);

            if let Some(stats) = self.match_stats.get(&outcome.external_id) {
                print!(
                    "  [{} matches, {} results, {} failed]",
                    stats.stored, stats.results_completed, stats.results_failed
                );
            }
            println!();
        }
    }
}

/// Rows returned by a nickname lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupResult {
    pub rows: Vec<PlayerMatchRow>,
    pub total: usize,
}

impl LookupResult {
    pub fn new(rows: Vec<PlayerMatchRow>) -> Self {
        let total = rows.len();
        Self { rows, total }
    }

    pub fn print(&self) {
        println!("{} {}", self.total.to_string().bold(), "matches found".bold());

        for row in &self.rows {
            let average = row
                .stats
                .average
                .map(|avg| format!("{avg:.2}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} {:<28} {} vs {} ({}) avg {}",
                row.tournament_date,
                row.tournament_name,
                row.player_name.cyan(),
                row.opponent_name,
                row.match_type,
                average
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, action: TournamentAction) -> TournamentOutcome {
        TournamentOutcome {
            external_id: id.to_string(),
            title: format!("Event {id}"),
            action,
            status: None,
        }
    }

    #[test]
    fn test_record_counts_actions() {
        let mut summary = SyncSummary::default();
        summary.record(outcome("t1", TournamentAction::Inserted), Some(MatchImportStats::default()));
        summary.record(outcome("t2", TournamentAction::Skipped), None);
        summary.record(outcome("t3", TournamentAction::Updated), None);

        assert_eq!((summary.inserted, summary.updated, summary.skipped), (1, 1, 1));
        assert_eq!(summary.total_processed, 3);
        assert_eq!(summary.actions.len(), 3);
        assert_eq!(summary.match_stats.len(), 1);
    }

    #[test]
    fn test_summary_serializes_actions_in_snake_case() {
        let mut summary = SyncSummary::default();
        summary.record(outcome("t1", TournamentAction::Inserted), None);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["inserted"], 1);
        assert_eq!(json["actions"][0]["action"], "inserted");
    }
}
