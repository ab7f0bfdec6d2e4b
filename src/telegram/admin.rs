//! Admin functionality for the Telegram bot

use anyhow::Result;
use teloxide::prelude::*;

use crate::core::backup::BackupHandle;
use crate::core::config::admin::{ADMIN_IDS, ADMIN_USER_ID};

/// Check if user is admin
pub fn is_admin(user_id: i64) -> bool {
    is_admin_in(user_id, &ADMIN_IDS, *ADMIN_USER_ID)
}

/// ADMIN_IDS wins when set, otherwise the single ADMIN_USER_ID
fn is_admin_in(user_id: i64, admin_ids: &[i64], admin_user_id: i64) -> bool {
    if !admin_ids.is_empty() {
        return admin_ids.contains(&user_id);
    }
    if admin_user_id != 0 {
        return admin_user_id == user_id;
    }
    false
}

/// Handle /backup command - queue an immediate CSV backup
///
/// The file itself arrives through the backup notification dispatcher.
///
/// # Arguments
/// * `bot` - Bot instance
/// * `chat_id` - Chat ID where to send response
/// * `user_id` - Telegram user ID of the requester
/// * `backup` - Handle of the running backup scheduler
pub async fn handle_backup_command(bot: &Bot, chat_id: ChatId, user_id: i64, backup: &BackupHandle) -> Result<()> {
    if !is_admin(user_id) {
        log::warn!("User {} tried to run /backup without permission", user_id);
        bot.send_message(chat_id, "❌ У тебя нет прав для выполнения этой команды.")
            .await?;
        return Ok(());
    }

    if backup.request(user_id) {
        log::info!("💾 Manual backup requested by admin {}", user_id);
        bot.send_message(chat_id, "⏳ Создаю бэкап, файл придёт отдельным сообщением...")
            .await?;
    } else {
        log::error!("Backup scheduler is not running");
        bot.send_message(chat_id, "❌ Планировщик бэкапов не запущен.").await?;
    }

    Ok(())
}
