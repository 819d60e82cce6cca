use anyhow::Result;
use log::{error, info, warn};

use super::summary::{MatchImportStats, SyncSummary, TournamentAction, TournamentOutcome};
use crate::browser::PageLoader;
use crate::config::AppConfig;
use crate::database::{ImportStatus, ImportStore, Match, Tournament};
use crate::domain::{DiscoveredTournament, MatchKey, SyncProgress};
use crate::errors::validate_term;
use crate::retry::RetryPolicy;
use crate::scrapers::{MatchListScraper, PlayerResultScraper, TournamentDiscovery};

/// Drives discovery, scraping and persistence for both sync flows
pub struct SyncOrchestrator<L> {
    pub(super) loader: L,
    pub(super) store: ImportStore,
    pub(super) discovery: TournamentDiscovery,
    pub(super) match_list: MatchListScraper,
    player_results: PlayerResultScraper,
    pub(super) lookup_cap: usize,
}

impl<L: PageLoader> SyncOrchestrator<L> {
    pub fn new(loader: L, store: ImportStore, config: &AppConfig) -> Self {
        Self {
            loader,
            store,
            discovery: TournamentDiscovery::new(config.scraper.clone()),
            match_list: MatchListScraper::new(),
            player_results: PlayerResultScraper::new(RetryPolicy::new(config.sync.retry_delays.clone())),
            lookup_cap: config.sync.lookup_cap,
        }
    }

    pub fn store(&self) -> &ImportStore {
        &self.store
    }

    /// Import every completed tournament found for `keyword`. Failures are
    /// recorded on the tournament or match they belong to; only input
    /// validation and discovery errors end the run.
    pub async fn full_sync(&self, keyword: &str) -> Result<SyncSummary> {
        let keyword = validate_term("keyword", keyword)?;
        info!("=== Starting full sync for '{}' ===\n", keyword);

        let discovered = self.discovery.discover(&self.loader, &keyword).await?;
        let mut progress = SyncProgress::new(discovered.len());
        let mut summary = SyncSummary::default();

        for tournament in &discovered {
            let (outcome, stats) = self.sync_tournament(tournament).await;

            match (outcome.action, outcome.status) {
                (TournamentAction::Skipped, _) => progress.increment_skipped(),
                (_, Some(ImportStatus::Failed)) => progress.increment_failed(),
                _ => progress.increment_imported(),
            }
            summary.record(outcome, stats);
        }

        info!("=== Full sync complete ===");
        Ok(summary)
    }

    async fn sync_tournament(
        &self,
        discovered: &DiscoveredTournament,
    ) -> (TournamentOutcome, Option<MatchImportStats>) {
        let mut outcome = TournamentOutcome {
            external_id: discovered.external_id.clone(),
            title: discovered.title.clone(),
            action: TournamentAction::Skipped,
            status: None,
        };

        let (tournament, created) = match self.store.ensure_tournament(discovered) {
            Ok(stored) => stored,
            Err(err) => {
                error!("Failed to store tournament {}: {:#}", discovered.external_id, err);
                return (outcome, None);
            }
        };

        outcome.status = tournament.import_status;
        if tournament.import_status == Some(ImportStatus::Completed) {
            info!("Tournament {} already imported, skipping", tournament.external_id);
            return (outcome, None);
        }

        outcome.action = if created {
            TournamentAction::Inserted
        } else {
            TournamentAction::Updated
        };

        info!("Importing tournament {} ({})", tournament.external_id, tournament.title);
        let stats = self.import_tournament(&tournament).await;

        outcome.status = match self.store.find_tournament(&tournament.external_id) {
            Ok(stored) => stored.and_then(|t| t.import_status),
            Err(err) => {
                warn!("Could not re-read tournament {}: {:#}", tournament.external_id, err);
                None
            }
        };

        (outcome, Some(stats))
    }

    async fn import_tournament(&self, tournament: &Tournament) -> MatchImportStats {
        let mut stats = MatchImportStats::default();

        if let Err(err) = self.store.set_tournament_status(tournament.id, ImportStatus::InProgress, None) {
            warn!("Could not mark tournament {} in progress: {:#}", tournament.external_id, err);
        }

        if let Err(err) = self.import_matches(tournament, &mut stats).await {
            let message = format!("{:#}", err);
            error!("Match list of {} failed: {}", tournament.external_id, message);

            if let Err(err) = self.store.set_tournament_status(tournament.id, ImportStatus::Failed, Some(&message)) {
                warn!("Could not record failure of {}: {:#}", tournament.external_id, err);
            }
            stats.error = Some(message);
            return stats;
        }

        self.import_results(tournament, &mut stats).await;
        self.finish_tournament(tournament);
        stats
    }

    /// Scrape and store the match list unless matches are already stored
    async fn import_matches(&self, tournament: &Tournament, stats: &mut MatchImportStats) -> Result<()> {
        let stored = self.store.stored_match_count(tournament.id)?;
        if stored > 0 {
            info!("  → {} matches already stored", stored);
            stats.stored = stored;
            return Ok(());
        }

        let scraped = self.match_list.scrape(&self.loader, &tournament.link).await?;
        let batch = self.store.save_matches(tournament.id, &scraped)?;

        stats.scraped = batch.scraped;
        stats.inserted = batch.inserted;
        stats.stored = batch.stored;
        info!("  → Saved {} new matches ({} stored)", batch.inserted, batch.stored);
        Ok(())
    }

    async fn import_results(&self, tournament: &Tournament, stats: &mut MatchImportStats) {
        let pending = match self.store.pending_matches(tournament.id) {
            Ok(pending) => pending,
            Err(err) => {
                error!("Could not list matches of {}: {:#}", tournament.external_id, err);
                stats.error = Some(format!("{:#}", err));
                return;
            }
        };

        info!("  → {} matches need statistics", pending.len());

        for m in &pending {
            match self.import_match_results(m).await {
                Ok(()) => stats.results_completed += 1,
                Err(err) => {
                    warn!("Statistics of {} failed: {:#}", m.external_id, err);
                    stats.results_failed += 1;
                }
            }
        }
    }

    async fn import_match_results(&self, m: &Match) -> Result<()> {
        self.store.set_match_status(m.id, ImportStatus::InProgress, None)?;

        let saved: Result<()> = async {
            let key = MatchKey::from_columns(&m.external_id, m.stage, &m.round, &m.player_code, &m.opponent_code)?;
            let results = self.player_results.scrape(&self.loader, &m.link, &key).await?;
            self.store.save_player_results(m.id, &results)
        }
        .await;

        if let Err(err) = saved {
            self.store
                .set_match_status(m.id, ImportStatus::Failed, Some(&format!("{:#}", err)))?;
            return Err(err);
        }

        Ok(())
    }

    fn finish_tournament(&self, tournament: &Tournament) {
        match self.store.refresh_tournament_status(tournament.id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                info!("  → No matches played, marking {} completed", tournament.external_id);
                if let Err(err) = self.store.set_tournament_status(tournament.id, ImportStatus::Completed, None) {
                    warn!("Could not complete {}: {:#}", tournament.external_id, err);
                }
            }
            Err(err) => warn!("Could not refresh status of {}: {:#}", tournament.external_id, err),
        }
    }
}
