use anyhow::Result;
use log::{debug, info, warn};

use super::summary::LookupResult;
use super::sync::SyncOrchestrator;
use crate::browser::PageLoader;
use crate::database::LookupScope;
use crate::domain::{orient, DiscoveredTournament, Orientation, PlayerMatchRow, PlayerStats, ScrapedMatch};
use crate::errors::validate_term;

impl<L: PageLoader> SyncOrchestrator<L> {
    /// Nickname lookup bounded by the configured cap
    pub async fn nickname_lookup(&self, keyword: &str, nickname: &str) -> Result<LookupResult> {
        self.bounded_lookup(keyword, nickname, self.lookup_cap).await
    }

    /// Collect at most `cap` matches for `nickname` across the tournaments
    /// found for `keyword`. Stored tournaments are answered from the
    /// database; the rest are scraped live and persisted on the way.
    /// Tournaments after the cap is reached are never loaded.
    pub async fn bounded_lookup(&self, keyword: &str, nickname: &str, cap: usize) -> Result<LookupResult> {
        let keyword = validate_term("keyword", keyword)?;
        let nickname = validate_term("nickname", nickname)?;
        info!("Looking up '{}' in tournaments for '{}'", nickname, keyword);

        let tournaments = match self.discovery.discover(&self.loader, &keyword).await {
            Ok(tournaments) => tournaments,
            Err(err) => {
                warn!("Discovery for '{}' failed: {:#}", keyword, err);
                return Ok(LookupResult::default());
            }
        };

        let mut rows: Vec<PlayerMatchRow> = Vec::new();

        for tournament in &tournaments {
            if rows.len() >= cap {
                debug!("Cap of {} reached, stopping", cap);
                break;
            }
            let remaining = cap - rows.len();

            match self.lookup_tournament(tournament, &nickname, remaining).await {
                Ok(found) => rows.extend(found.into_iter().take(remaining)),
                Err(err) => warn!("Lookup in {} failed: {:#}", tournament.external_id, err),
            }
        }

        info!("  → {} matches found", rows.len());
        Ok(LookupResult::new(rows))
    }

    async fn lookup_tournament(
        &self,
        tournament: &DiscoveredTournament,
        nickname: &str,
        limit: usize,
    ) -> Result<Vec<PlayerMatchRow>> {
        if let Some(stored) = self.store.matches_fully_saved(&tournament.external_id)? {
            debug!("  → {} answered from the database", tournament.external_id);
            return self
                .store
                .find_player_matches(nickname, LookupScope::Tournament(stored.id), limit);
        }

        let scraped = self.match_list.scrape(&self.loader, &tournament.link).await?;
        self.persist_scraped(tournament, &scraped);

        Ok(scraped
            .iter()
            .filter_map(|m| live_row(tournament, m, nickname))
            .take(limit)
            .collect())
    }

    fn persist_scraped(&self, tournament: &DiscoveredTournament, scraped: &[ScrapedMatch]) {
        let saved = self
            .store
            .ensure_tournament(tournament)
            .and_then(|(stored, _)| self.store.save_matches(stored.id, scraped));

        if let Err(err) = saved {
            warn!("Could not store matches of {}: {:#}", tournament.external_id, err);
        }
    }
}

/// Row for a freshly scraped match, oriented so the searched player comes first
fn live_row(tournament: &DiscoveredTournament, m: &ScrapedMatch, nickname: &str) -> Option<PlayerMatchRow> {
    let (player, opponent) = match orient(nickname, &m.player.name, &m.opponent.name)? {
        Orientation::AsIs => (&m.player, &m.opponent),
        Orientation::Swapped => (&m.opponent, &m.player),
    };

    Some(PlayerMatchRow {
        tournament_name: tournament.title.clone(),
        tournament_link: tournament.link.clone(),
        tournament_date: tournament.date,
        match_link: m.link.clone(),
        match_type: m.match_type.clone(),
        stage: m.stage,
        player_name: player.name.clone(),
        player_code: player.code.clone(),
        opponent_name: opponent.name.clone(),
        opponent_code: opponent.code.clone(),
        is_checked: true,
        stats: PlayerStats::default(),
    })
}
