pub mod ids;
pub mod models;
pub mod nickname;
mod progress;

pub use ids::{canonical_match_id, player_identifier, tournament_id_from_link, MatchKey};
pub use models::*;
pub use nickname::{orient, Orientation};
pub use progress::SyncProgress;
