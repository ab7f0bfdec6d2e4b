//! Persistence of finished registrations
//!
//! The engine and the backup job depend on [`ParticipantStore`] only; the
//! SQLite implementation keeps the discipline map as a JSON text column.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::{params, Row};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::error::AppResult;
use crate::registration::model::{Discipline, GameData, Participant};
use crate::storage::db::{self, DbPool};

/// Keyed store of participants.
///
/// Implementations must make `upsert` atomic per Telegram id so that two
/// racing confirmations converge to the last write.
pub trait ParticipantStore: Send + Sync {
    /// Inserts the participant or fully overwrites the row with the same
    /// Telegram id. Returns the stored record with `id` and `created_at` set.
    fn upsert(&self, participant: &Participant) -> AppResult<Participant>;

    fn get_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<Participant>>;

    /// Newest registrations first
    fn list_recent(&self, limit: usize) -> AppResult<Vec<Participant>>;

    /// Every registration ordered by id
    fn list_all(&self) -> AppResult<Vec<Participant>>;
}

/// SQLite-backed store over the shared connection pool
#[derive(Clone)]
pub struct SqliteParticipantStore {
    pool: Arc<DbPool>,
}

const SELECT_COLUMNS: &str = "SELECT id, telegram_id, first_name, last_name, class, disciplines, created_at FROM participants";

/// SQLite `CURRENT_TIMESTAMP` format (UTC)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(e) => {
            log::warn!("Unparseable created_at {:?}: {}", raw, e);
            None
        }
    }
}

/// A corrupt JSON column must not make the row unreadable.
fn parse_disciplines(telegram_id: i64, raw: &str) -> BTreeMap<Discipline, GameData> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!(
            "Invalid disciplines JSON for telegram_id {}: {}. Reading as empty",
            telegram_id,
            e
        );
        BTreeMap::new()
    })
}

fn participant_from_row(row: &Row<'_>) -> rusqlite::Result<Participant> {
    let telegram_id: i64 = row.get(1)?;
    let disciplines: String = row.get(5)?;
    let created_at: Option<String> = row.get(6)?;

    Ok(Participant {
        id: Some(row.get(0)?),
        telegram_id,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        class_label: row.get(4)?,
        disciplines: parse_disciplines(telegram_id, &disciplines),
        created_at: created_at.as_deref().and_then(parse_timestamp),
    })
}

impl SqliteParticipantStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl ParticipantStore for SqliteParticipantStore {
    fn upsert(&self, participant: &Participant) -> AppResult<Participant> {
        let conn = db::get_connection(&self.pool)?;
        let disciplines = serde_json::to_string(&participant.disciplines)?;

        let (id, created_at): (i64, String) = conn.query_row(
            "INSERT INTO participants (telegram_id, first_name, last_name, class, disciplines)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(telegram_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                class = excluded.class,
                disciplines = excluded.disciplines
             RETURNING id, created_at",
            params![
                participant.telegram_id,
                participant.first_name,
                participant.last_name,
                participant.class_label,
                disciplines
            ],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        log::info!(
            "💾 Saved participant telegram_id={} id={} ({} disciplines)",
            participant.telegram_id,
            id,
            participant.disciplines.len()
        );

        Ok(Participant {
            id: Some(id),
            created_at: parse_timestamp(&created_at),
            ..participant.clone()
        })
    }

    fn get_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<Participant>> {
        let conn = db::get_connection(&self.pool)?;
        let mut stmt = conn.prepare(&format!("{} WHERE telegram_id = ?1", SELECT_COLUMNS))?;
        let mut rows = stmt.query_map([telegram_id], participant_from_row)?;

        Ok(rows.next().transpose()?)
    }

    fn list_recent(&self, limit: usize) -> AppResult<Vec<Participant>> {
        let conn = db::get_connection(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, id DESC LIMIT ?1",
            SELECT_COLUMNS
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], participant_from_row)?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_all(&self) -> AppResult<Vec<Participant>> {
        let conn = db::get_connection(&self.pool)?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], participant_from_row)?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
