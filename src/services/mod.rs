pub mod lookup;
pub mod summary;
pub mod sync;

pub use summary::{LookupResult, MatchImportStats, SyncSummary, TournamentAction, TournamentOutcome};
pub use sync::SyncOrchestrator;
