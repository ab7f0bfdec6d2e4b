//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! Handlers only translate updates into registration events and replies
//! back into messages; the dialogue itself lives in the engine.

mod schema;
mod types;

pub use schema::schema;
pub use types::{user_id_of, HandlerDeps, HandlerError};
