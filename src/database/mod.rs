pub mod connection;
pub mod lookup;
pub mod matches;
pub mod models;
pub mod player_results;
pub mod setup;
pub mod store;
pub mod tournaments;

pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};
pub use models::*;
pub use store::ImportStore;
