//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::User;

use crate::core::backup::BackupHandle;
use crate::registration::engine::RegistrationEngine;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub engine: Arc<RegistrationEngine>,
    pub backup: BackupHandle,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(engine: Arc<RegistrationEngine>, backup: BackupHandle) -> Self {
        Self { engine, backup }
    }
}

/// Telegram user id as the signed id used for sessions and storage
pub fn user_id_of(user: &User) -> Option<i64> {
    i64::try_from(user.id.0).ok()
}
