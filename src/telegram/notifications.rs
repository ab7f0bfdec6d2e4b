use std::fs;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tokio::sync::mpsc;

use crate::core::backup::{BackupEvent, BackupReport, BackupTrigger};
use crate::core::config::{self, admin::ADMIN_USER_ID};

/// Chat that receives scheduled backups: ADMIN_USER_ID, or none when unset
fn admin_chat() -> Option<ChatId> {
    match *ADMIN_USER_ID {
        0 => None,
        id => Some(ChatId(id)),
    }
}

/// Manual backups go back to the admin who asked, scheduled ones to ADMIN_USER_ID
fn recipient(trigger: BackupTrigger) -> Option<ChatId> {
    match trigger {
        BackupTrigger::Manual { requested_by } => Some(ChatId(requested_by)),
        BackupTrigger::Scheduled => admin_chat(),
    }
}

/// Caption under the backup document
pub fn backup_caption(report: &BackupReport) -> String {
    format!(
        "📊 Бэкап базы данных {}\n🕐 Время: {}\n📁 Файл: {}\n👥 Участников: {}\n💾 Размер: {:.2} KB",
        config::TOURNAMENT_NAME,
        report.generated_at.format("%Y-%m-%d %H:%M:%S"),
        report.file_name,
        report.participants,
        report.size_kb()
    )
}

/// Sends a plain text notification to the administrator.
///
/// Errors are logged, never returned.
pub async fn notify_admin_text(bot: &Bot, text: &str) {
    let Some(chat_id) = admin_chat() else {
        log::debug!("ADMIN_USER_ID not set, skipping admin notification");
        return;
    };

    if let Err(e) = bot.send_message(chat_id, text).await {
        log::error!("Failed to send admin notification: {}", e);
    }
}

/// Announces startup to the administrator
pub async fn notify_admin_startup(bot: &Bot) {
    let backup_line = match config::backup::interval() {
        Some(interval) => format!("Автоматический бэкап каждые {} минут.", interval.as_secs() / 60),
        None => "Автоматический бэкап отключён.".to_string(),
    };

    notify_admin_text(
        bot,
        &format!(
            "🤖 Бот регистрации {} запущен.\n💾 {}\nКоманда /backup выгружает бэкап сразу.",
            config::TOURNAMENT_NAME,
            backup_line
        ),
    )
    .await;
}

async fn deliver_backup(bot: &Bot, report: &BackupReport) {
    match recipient(report.trigger) {
        Some(chat_id) => {
            let result = bot
                .send_document(chat_id, InputFile::file(report.path.clone()))
                .caption(backup_caption(report))
                .await;

            match result {
                Ok(_) => log::info!("📤 Backup {} sent to {}", report.file_name, chat_id),
                Err(e) => log::error!("Failed to send backup {}: {}", report.file_name, e),
            }
        }
        None => log::warn!("No admin chat configured, backup {} not delivered", report.file_name),
    }

    if let Err(e) = fs::remove_file(&report.path) {
        log::warn!("Failed to remove backup file {}: {}", report.path.display(), e);
    }
}

/// Consumes backup events and delivers them to Telegram.
///
/// Runs until the scheduler side of the channel is closed.
pub fn start_backup_notifier(bot: Bot, mut events: mpsc::UnboundedReceiver<BackupEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                BackupEvent::Completed(report) => deliver_backup(&bot, &report).await,
                BackupEvent::Failed { trigger, error } => {
                    let text = format!("❌ Ошибка создания бэкапа: {}", error);
                    match recipient(trigger) {
                        Some(chat_id) => {
                            if let Err(e) = bot.send_message(chat_id, text).await {
                                log::error!("Failed to report backup failure: {}", e);
                            }
                        }
                        None => log::warn!("{}", text),
                    }
                }
            }
        }
        log::info!("Backup notifier stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::path::PathBuf;

    #[test]
    fn test_backup_caption() {
        let report = BackupReport {
            path: PathBuf::from("/tmp/backup.csv"),
            file_name: "backup_etriathlon_2026-03-01_12-30-05.csv".to_string(),
            size_bytes: 2048,
            participants: 12,
            generated_at: Local.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap(),
            trigger: BackupTrigger::Scheduled,
        };

        let caption = backup_caption(&report);
        assert!(caption.contains("eTriathlon 2026"));
        assert!(caption.contains("🕐 Время: 2026-03-01 12:30:05"));
        assert!(caption.contains("📁 Файл: backup_etriathlon_2026-03-01_12-30-05.csv"));
        assert!(caption.contains("👥 Участников: 12"));
        assert!(caption.contains("💾 Размер: 2.00 KB"));
    }

    #[test]
    fn test_manual_backup_goes_to_requester() {
        assert_eq!(
            recipient(BackupTrigger::Manual { requested_by: 77 }),
            Some(ChatId(77))
        );
    }
}
