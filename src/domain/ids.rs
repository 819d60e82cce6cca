use url::Url;

use super::models::Stage;
use crate::errors::ScrapeError;

/// Canonical match id; the two codes are sorted so both renderings of a
/// fixture produce the same id
pub fn canonical_match_id(
    tournament_id: &str,
    stage: Stage,
    round: &str,
    code_a: &str,
    code_b: &str,
) -> String {
    let (lo, hi) = if code_a <= code_b {
        (code_a, code_b)
    } else {
        (code_b, code_a)
    };
    format!("{}_{}_{}_{}_{}", tournament_id, stage.tag(), round, lo, hi)
}

/// Key of one player's result row within a match
pub fn player_identifier(tournament_id: &str, stage: Stage, round: &str, player_code: &str) -> String {
    format!("{}_{}_{}_{}", tournament_id, stage.tag(), round, player_code)
}

/// Components of a canonical match id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKey {
    pub tournament_id: String,
    pub stage: Stage,
    pub round: String,
    pub code_lo: String,
    pub code_hi: String,
}

impl MatchKey {
    /// Split from the right: the tournament id is the only part that may
    /// itself contain underscores
    pub fn parse(match_id: &str) -> Result<Self, ScrapeError> {
        let mut parts = match_id.rsplitn(5, '_');
        let code_hi = parts.next();
        let code_lo = parts.next();
        let round = parts.next();
        let tag = parts.next();
        let tournament_id = parts.next();

        match (tournament_id, tag.and_then(Stage::from_tag), round, code_lo, code_hi) {
            (Some(tid), Some(stage), Some(round), Some(lo), Some(hi))
                if [tid, round, lo, hi].iter().all(|p| !p.is_empty()) =>
            {
                Ok(Self {
                    tournament_id: tid.to_string(),
                    stage,
                    round: round.to_string(),
                    code_lo: lo.to_string(),
                    code_hi: hi.to_string(),
                })
            }
            _ => Err(ScrapeError::Structure(format!("malformed match id: {match_id}"))),
        }
    }

    /// Key of a stored match, taken from its stage, round and code columns.
    /// The stored id must end with the id those columns produce; the rest of
    /// it is the tournament id.
    pub fn from_columns(
        match_id: &str,
        stage: Stage,
        round: &str,
        code_a: &str,
        code_b: &str,
    ) -> Result<Self, ScrapeError> {
        let suffix = canonical_match_id("", stage, round, code_a, code_b);
        let tournament_id = match_id
            .strip_suffix(&suffix)
            .filter(|tid| !tid.is_empty() && !round.is_empty())
            .ok_or_else(|| {
                ScrapeError::Structure(format!("match id {match_id} disagrees with its stored columns"))
            })?;

        let (lo, hi) = if code_a <= code_b { (code_a, code_b) } else { (code_b, code_a) };
        Ok(Self {
            tournament_id: tournament_id.to_string(),
            stage,
            round: round.to_string(),
            code_lo: lo.to_string(),
            code_hi: hi.to_string(),
        })
    }

    pub fn match_id(&self) -> String {
        canonical_match_id(&self.tournament_id, self.stage, &self.round, &self.code_lo, &self.code_hi)
    }

    pub fn player_identifier(&self, player_code: &str) -> String {
        player_identifier(&self.tournament_id, self.stage, &self.round, player_code)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.code_lo == code || self.code_hi == code
    }
}

/// External tournament id embedded in an event link: the `id` query value,
/// or else a numeric last path segment
pub fn tournament_id_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;

    if let Some((_, id)) = url.query_pairs().find(|(key, value)| key == "id" && !value.is_empty()) {
        return Some(id.into_owned());
    }

    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .filter(|segment| segment.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}
