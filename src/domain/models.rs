use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Portion of a tournament bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Group,
    Knockout,
}

impl Stage {
    /// Short tag used by the source site and inside canonical ids
    pub fn tag(self) -> &'static str {
        match self {
            Stage::Group => "rr",
            Stage::Knockout => "t",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rr" => Some(Stage::Group),
            "t" => Some(Stage::Knockout),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Group => "group",
            Stage::Knockout => "knockout",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "group" => Some(Stage::Group),
            "knockout" => Some(Stage::Knockout),
            _ => None,
        }
    }
}

/// Completed event found by keyword search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredTournament {
    pub external_id: String,
    pub title: String,
    pub link: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSide {
    pub name: String,
    pub code: String,
}

/// One fixture read from an event page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedMatch {
    pub external_id: String,
    pub stage: Stage,
    pub round: String,
    pub match_type: String,
    pub player: MatchSide,
    pub opponent: MatchSide,
    pub link: String,
}

/// Per-player statistics of one match; absent values stay null
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub average: Option<f64>,
    pub first_nine_average: Option<f64>,
    pub checkout_percentage: Option<f64>,
    pub checkout_hits: Option<i64>,
    pub score_60_count: Option<i64>,
    pub score_100_count: Option<i64>,
    pub score_140_count: Option<i64>,
    pub score_180_count: Option<i64>,
    pub high_finish: Option<i64>,
    pub best_leg: Option<i64>,
    pub worst_leg: Option<i64>,
    pub legs_won: Option<i64>,
    pub legs_lost: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPlayerResult {
    pub player_identifier: String,
    pub player_code: String,
    pub stats: PlayerStats,
}

/// Player-oriented match row handed to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMatchRow {
    pub tournament_name: String,
    pub tournament_link: String,
    pub tournament_date: NaiveDate,
    pub match_link: String,
    pub match_type: String,
    pub stage: Stage,
    pub player_name: String,
    pub player_code: String,
    pub opponent_name: String,
    pub opponent_code: String,
    /// Preselected for import by the consuming UI
    #[serde(rename = "isChecked")]
    pub is_checked: bool,
    #[serde(flatten)]
    pub stats: PlayerStats,
}
