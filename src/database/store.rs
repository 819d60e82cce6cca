use anyhow::Result;
use log::{debug, info};

use super::connection::{create_memory_pool, create_pool, get_connection, DbPool};
use super::models::{ImportStatus, LookupScope, Match, MatchBatchOutcome, Tournament};
use super::{lookup, matches, player_results, setup, tournaments};
use crate::domain::{DiscoveredTournament, PlayerMatchRow, ScrapedMatch, ScrapedPlayerResult};

/// Persistence operations the sync flows need, over a pooled SQLite database
#[derive(Clone)]
pub struct ImportStore {
    pool: DbPool,
}

impl ImportStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and make sure the schema exists
    pub fn open(database_path: &str) -> Result<Self> {
        let store = Self::new(create_pool(database_path)?);
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let store = Self::new(create_memory_pool()?);
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        setup::ensure_schema(&mut conn)
    }

    /// Returns the stored tournament and whether it was created by this call
    pub fn ensure_tournament(&self, tournament: &DiscoveredTournament) -> Result<(Tournament, bool)> {
        let mut conn = get_connection(&self.pool)?;
        tournaments::insert_if_absent(&mut conn, tournament)
    }

    pub fn find_tournament(&self, external_id: &str) -> Result<Option<Tournament>> {
        let mut conn = get_connection(&self.pool)?;
        tournaments::find_by_external_id(&mut conn, external_id)
    }

    pub fn set_tournament_status(
        &self,
        tournament_id: i64,
        status: ImportStatus,
        error: Option<&str>,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        tournaments::set_import_status(&mut conn, tournament_id, Some(status), error)
    }

    /// Insert scraped matches, ignoring ones already stored, then flag the
    /// tournament as fully saved or leave it in progress
    pub fn save_matches(&self, tournament_id: i64, scraped: &[ScrapedMatch]) -> Result<MatchBatchOutcome> {
        let mut conn = get_connection(&self.pool)?;

        let inserted = matches::insert_batch(&mut conn, tournament_id, scraped)?;
        let stored = matches::count_by_tournament(&mut conn, tournament_id)?;
        let outcome = MatchBatchOutcome {
            scraped: scraped.len(),
            inserted,
            stored,
        };

        if outcome.fully_saved() {
            tournaments::set_matches_saved(&mut conn, tournament_id, true)?;
        } else {
            tournaments::set_import_status(&mut conn, tournament_id, Some(ImportStatus::InProgress), None)?;
        }

        debug!(
            "Tournament {}: {} scraped, {} inserted, {} stored",
            tournament_id, outcome.scraped, outcome.inserted, outcome.stored
        );
        Ok(outcome)
    }

    pub fn stored_match_count(&self, tournament_id: i64) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        matches::count_by_tournament(&mut conn, tournament_id)
    }

    pub fn matches_fully_saved(&self, external_id: &str) -> Result<Option<Tournament>> {
        Ok(self.find_tournament(external_id)?.filter(|t| t.matches_saved))
    }

    pub fn tournament_matches(&self, tournament_id: i64) -> Result<Vec<Match>> {
        let mut conn = get_connection(&self.pool)?;
        matches::list_by_tournament(&mut conn, tournament_id)
    }

    pub fn pending_matches(&self, tournament_id: i64) -> Result<Vec<Match>> {
        let mut conn = get_connection(&self.pool)?;
        matches::list_pending(&mut conn, tournament_id)
    }

    pub fn set_match_status(&self, match_id: i64, status: ImportStatus, error: Option<&str>) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        matches::set_result_status(&mut conn, match_id, status, error)
    }

    /// Upsert both result rows and complete the match
    pub fn save_player_results(&self, match_id: i64, results: &[ScrapedPlayerResult; 2]) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        player_results::upsert_pair(&mut conn, match_id, results)
    }

    pub fn player_results(&self, match_id: i64) -> Result<Vec<super::models::PlayerResult>> {
        let mut conn = get_connection(&self.pool)?;
        player_results::list_by_match(&mut conn, match_id)
    }

    /// Recompute the tournament status from its matches. A tournament without
    /// matches keeps its current status.
    pub fn refresh_tournament_status(&self, tournament_id: i64) -> Result<Option<ImportStatus>> {
        let mut conn = get_connection(&self.pool)?;

        let statuses = matches::result_statuses(&mut conn, tournament_id)?;
        let Some(status) = ImportStatus::aggregate(&statuses) else {
            return Ok(None);
        };

        let error = match status {
            ImportStatus::Failed => {
                let failed = statuses
                    .iter()
                    .filter(|s| **s == Some(ImportStatus::Failed))
                    .count();
                Some(format!("{} of {} matches failed", failed, statuses.len()))
            }
            _ => None,
        };

        tournaments::set_import_status(&mut conn, tournament_id, Some(status), error.as_deref())?;
        info!("  → Tournament {} is now {}", tournament_id, status.as_str());
        Ok(Some(status))
    }

    pub fn find_player_matches(
        &self,
        nickname: &str,
        scope: LookupScope,
        limit: usize,
    ) -> Result<Vec<PlayerMatchRow>> {
        let mut conn = get_connection(&self.pool)?;
        lookup::find_player_matches(&mut conn, nickname, scope, limit)
    }
}
