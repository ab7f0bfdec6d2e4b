//! eTriathlon - Telegram registration bot for a school esports tournament
//!
//! Walks a participant through a step-by-step dialogue (name, class,
//! disciplines with nicknames and player tags), stores the finished record in
//! SQLite, and periodically sends a CSV backup of all registrations to the
//! administrator.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, validation, and the backup job
//! - `registration`: Record model, session store, and the dialogue state machine
//! - `storage`: Database pool, migrations, participant store, and CSV export
//! - `telegram`: Bot setup, dispatcher schema, and admin notifications

pub mod cli;
pub mod core;
pub mod registration;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use registration::{RegistrationEngine, SessionStore};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, ParticipantStore, SqliteParticipantStore};
