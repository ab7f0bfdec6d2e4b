//! Database, participant persistence, and CSV backup export

pub mod db;
pub mod export;
pub mod migrations;
pub mod participants;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use participants::{ParticipantStore, SqliteParticipantStore};
