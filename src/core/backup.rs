//! Periodic and on-demand CSV backups
//!
//! The backup job has no Telegram dependency: it writes the file and emits a
//! [`BackupEvent`] through an mpsc channel. The Telegram layer delivers the
//! file to the administrator and removes it afterwards.

use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval};

use crate::core::error::AppResult;
use crate::storage::export;
use crate::storage::participants::ParticipantStore;

/// What started a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupTrigger {
    /// Interval timer
    Scheduled,
    /// `/backup` from an administrator
    Manual { requested_by: i64 },
}

/// Successfully written backup file
#[derive(Debug, Clone, PartialEq)]
pub struct BackupReport {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub participants: usize,
    pub generated_at: DateTime<Local>,
    pub trigger: BackupTrigger,
}

impl BackupReport {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Notification sent through the mpsc channel to the Telegram layer
#[derive(Debug, Clone, PartialEq)]
pub enum BackupEvent {
    Completed(BackupReport),
    Failed { trigger: BackupTrigger, error: String },
}

/// Writes backup files for a participant store into a directory
pub struct BackupJob {
    store: Arc<dyn ParticipantStore>,
    dir: PathBuf,
}

impl BackupJob {
    pub fn new(store: Arc<dyn ParticipantStore>, dir: impl Into<PathBuf>) -> Self {
        Self { store, dir: dir.into() }
    }

    /// Writes one backup file. Blocking (database read and file I/O).
    ///
    /// A partially written file is removed on failure.
    pub fn run_once(&self, now: DateTime<Local>, trigger: BackupTrigger) -> AppResult<BackupReport> {
        fs::create_dir_all(&self.dir)?;

        let file_name = export::backup_file_name(now);
        let path = self.dir.join(&file_name);

        let participants = match export::export_to_file(self.store.as_ref(), &path, now) {
            Ok(count) => count,
            Err(e) => {
                if path.exists() {
                    if let Err(remove_err) = fs::remove_file(&path) {
                        log::warn!("Failed to remove partial backup {}: {}", path.display(), remove_err);
                    }
                }
                return Err(e);
            }
        };

        let size_bytes = fs::metadata(&path)?.len();

        Ok(BackupReport {
            path,
            file_name,
            size_bytes,
            participants,
            generated_at: now,
            trigger,
        })
    }
}

/// Sender side used by `/backup` to request an immediate run
#[derive(Clone)]
pub struct BackupHandle {
    trigger_tx: mpsc::UnboundedSender<BackupTrigger>,
}

impl BackupHandle {
    /// Queues a manual backup. Returns `false` if the scheduler is gone.
    pub fn request(&self, requested_by: i64) -> bool {
        self.trigger_tx
            .send(BackupTrigger::Manual { requested_by })
            .is_ok()
    }
}

async fn run_in_background(job: &Arc<BackupJob>, trigger: BackupTrigger) -> BackupEvent {
    let job = Arc::clone(job);
    match tokio::task::spawn_blocking(move || job.run_once(Local::now(), trigger)).await {
        Ok(Ok(report)) => BackupEvent::Completed(report),
        Ok(Err(e)) => BackupEvent::Failed {
            trigger,
            error: e.to_string(),
        },
        Err(e) => BackupEvent::Failed {
            trigger,
            error: format!("Backup task panicked: {}", e),
        },
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Start the backup scheduler background task.
///
/// Runs every `period` (the first run happens one period after start; `None`
/// disables periodic runs) and whenever the returned handle requests one.
/// Returns the handle and a receiver for `BackupEvent`s that should be
/// consumed by the Telegram notification dispatcher.
pub fn start_backup_scheduler(
    job: Arc<BackupJob>,
    period: Option<Duration>,
) -> (BackupHandle, mpsc::UnboundedReceiver<BackupEvent>) {
    let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut ticker = period.map(|period| interval_at(Instant::now() + period, period));
        let mut triggers_open = true;

        match period {
            Some(period) => log::info!("💾 Backup scheduler started (every {} min)", period.as_secs() / 60),
            None => log::info!("💾 Backup scheduler started (manual only)"),
        }

        loop {
            let trigger = tokio::select! {
                received = trigger_rx.recv(), if triggers_open => match received {
                    Some(trigger) => trigger,
                    None => {
                        triggers_open = false;
                        if ticker.is_none() {
                            break;
                        }
                        continue;
                    }
                },
                _ = next_tick(&mut ticker) => BackupTrigger::Scheduled,
            };

            log::info!("💾 Running backup ({:?})", trigger);
            let event = run_in_background(&job, trigger).await;

            match &event {
                BackupEvent::Completed(report) => log::info!(
                    "✅ Backup written: {} ({} participants, {:.1} KB)",
                    report.file_name,
                    report.participants,
                    report.size_kb()
                ),
                BackupEvent::Failed { error, .. } => log::error!("❌ Backup failed: {}", error),
            }

            if event_tx.send(event).is_err() {
                log::warn!("Backup event receiver dropped, stopping scheduler");
                break;
            }
        }
    });

    (BackupHandle { trigger_tx }, event_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::registration::model::{Discipline, Participant};
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct FixedStore(Vec<Participant>);

    impl ParticipantStore for FixedStore {
        fn upsert(&self, participant: &Participant) -> AppResult<Participant> {
            Ok(participant.clone())
        }

        fn get_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<Participant>> {
            Ok(self.0.iter().find(|p| p.telegram_id == telegram_id).cloned())
        }

        fn list_recent(&self, limit: usize) -> AppResult<Vec<Participant>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }

        fn list_all(&self) -> AppResult<Vec<Participant>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenStore;

    impl ParticipantStore for BrokenStore {
        fn upsert(&self, _participant: &Participant) -> AppResult<Participant> {
            Err(AppError::Validation("store offline".to_string()))
        }

        fn get_by_telegram_id(&self, _telegram_id: i64) -> AppResult<Option<Participant>> {
            Err(AppError::Validation("store offline".to_string()))
        }

        fn list_recent(&self, _limit: usize) -> AppResult<Vec<Participant>> {
            Err(AppError::Validation("store offline".to_string()))
        }

        fn list_all(&self) -> AppResult<Vec<Participant>> {
            Err(AppError::Validation("store offline".to_string()))
        }
    }

    fn two_participants() -> Arc<dyn ParticipantStore> {
        let mut first = Participant::new(1);
        first.set_nickname(Discipline::Chess, "one");
        let mut second = Participant::new(2);
        second.set_nickname(Discipline::Chess, "two");
        Arc::new(FixedStore(vec![first, second]))
    }

    #[test]
    fn test_run_once_writes_file() {
        let dir = TempDir::new().unwrap();
        let job = BackupJob::new(two_participants(), dir.path().join("backups"));
        let now = Local.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap();

        let report = job.run_once(now, BackupTrigger::Scheduled).unwrap();

        assert_eq!(report.file_name, "backup_etriathlon_2026-03-01_12-30-05.csv");
        assert_eq!(report.participants, 2);
        assert!(report.path.exists());
        assert_eq!(report.size_bytes, fs::metadata(&report.path).unwrap().len());

        let content = fs::read_to_string(&report.path).unwrap();
        assert!(content.contains("Total registrations: 2"));
    }

    #[test]
    fn test_run_once_failure_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let job = BackupJob::new(Arc::new(BrokenStore), dir.path());

        let result = job.run_once(Local::now(), BackupTrigger::Scheduled);

        assert!(result.is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_manual_trigger_emits_completed() {
        let dir = TempDir::new().unwrap();
        let job = Arc::new(BackupJob::new(two_participants(), dir.path()));
        let (handle, mut events) = start_backup_scheduler(job, None);

        assert!(handle.request(42));

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            BackupEvent::Completed(report) => {
                assert_eq!(report.trigger, BackupTrigger::Manual { requested_by: 42 });
                assert_eq!(report.participants, 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_is_reported_through_channel() {
        let dir = TempDir::new().unwrap();
        let job = Arc::new(BackupJob::new(Arc::new(BrokenStore), dir.path()));
        let (handle, mut events) = start_backup_scheduler(job, None);

        handle.request(7);

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            BackupEvent::Failed {
                trigger: BackupTrigger::Manual { requested_by: 7 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_periodic_run() {
        let dir = TempDir::new().unwrap();
        let job = Arc::new(BackupJob::new(two_participants(), dir.path()));
        let (_handle, mut events) = start_backup_scheduler(job, Some(Duration::from_millis(50)));

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            BackupEvent::Completed(report) => assert_eq!(report.trigger, BackupTrigger::Scheduled),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scheduler_stops_when_handle_dropped_without_interval() {
        let dir = TempDir::new().unwrap();
        let job = Arc::new(BackupJob::new(two_participants(), dir.path()));
        let (handle, mut events) = start_backup_scheduler(job, None);
        drop(handle);

        let next = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap();
        assert!(next.is_none());
    }
}
