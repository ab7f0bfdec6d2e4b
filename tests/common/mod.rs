//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tempfile::TempDir;

use etriathlon::core::error::{AppError, AppResult};
use etriathlon::registration::{Event, Participant, RegistrationEngine, Reply, SessionStore};
use etriathlon::storage::{create_pool, ParticipantStore, SqliteParticipantStore};

/// In-memory participant store keyed by Telegram id.
///
/// `fail_writes` switches `upsert` into an error mode to simulate an
/// unreachable database.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<i64, Participant>>,
    next_id: AtomicUsize,
    fail_writes: AtomicBool,
    upserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl ParticipantStore for MemoryStore {
    fn upsert(&self, participant: &Participant) -> AppResult<Participant> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other("database is unreachable")));
        }

        let mut rows = self.rows.lock().unwrap();
        let (id, created_at) = match rows.get(&participant.telegram_id) {
            Some(existing) => (existing.id, existing.created_at),
            None => (
                Some(self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1),
                Some(Utc::now()),
            ),
        };

        let stored = Participant {
            id,
            created_at,
            ..participant.clone()
        };
        rows.insert(participant.telegram_id, stored.clone());
        Ok(stored)
    }

    fn get_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<Participant>> {
        Ok(self.rows.lock().unwrap().get(&telegram_id).cloned())
    }

    fn list_recent(&self, limit: usize) -> AppResult<Vec<Participant>> {
        let mut all = self.list_all()?;
        all.reverse();
        all.truncate(limit);
        Ok(all)
    }

    fn list_all(&self) -> AppResult<Vec<Participant>> {
        let mut all: Vec<Participant> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }
}

/// Engine over a fresh session store and the given participant store
pub fn engine_with(store: Arc<dyn ParticipantStore>) -> RegistrationEngine {
    RegistrationEngine::new(Arc::new(SessionStore::new()), store)
}

/// Feeds events in order and returns the replies to the last one
pub fn drive(engine: &RegistrationEngine, user_id: i64, events: Vec<Event>) -> Vec<Reply> {
    let mut last = Vec::new();
    for event in events {
        last = engine.handle(user_id, event);
    }
    last
}

pub fn text(value: &str) -> Event {
    Event::Text(value.to_string())
}

/// SQLite store in a temporary directory; keep the `TempDir` alive
pub fn temp_sqlite_store() -> (TempDir, SqliteParticipantStore) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("participants.sqlite");
    let pool = create_pool(path.to_str().unwrap()).unwrap();
    (dir, SqliteParticipantStore::new(Arc::new(pool)))
}
