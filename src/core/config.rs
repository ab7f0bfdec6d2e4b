use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Bot token
/// Read from BOT_TOKEN, TELEGRAM_TOKEN or TELOXIDE_TOKEN environment variable
/// Empty when none is set; startup refuses to run without it
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELEGRAM_TOKEN"))
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: database.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "database.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Temporary files directory (backup CSV files live here until they are sent)
/// Read from TEMP_FILES_DIR environment variable
/// Default: /tmp
pub static TEMP_FILES_DIR: Lazy<String> =
    Lazy::new(|| env::var("TEMP_FILES_DIR").unwrap_or_else(|_| "/tmp".to_string()));

/// Custom Bot API server URL (local telegram-bot-api), if any
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| {
    env::var("BOT_API_URL").ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
});

/// Tournament name used in greetings and backup headers
pub const TOURNAMENT_NAME: &str = "eTriathlon 2026";

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub(crate) fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });

    /// Admin user ID that receives backups and failure notices
    /// Read from ADMIN_USER_ID or fallback to first ADMIN_IDS entry
    /// Defaults to 0 if not set (no admin notifications)
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_USER_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .or_else(|| ADMIN_IDS.first().copied())
            .unwrap_or(0)
    });
}

/// Backup export configuration
pub mod backup {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Default interval between automatic backups (in minutes)
    pub const DEFAULT_INTERVAL_MINUTES: u64 = 30;

    /// Interval between automatic backups
    /// Read from BACKUP_INTERVAL_MINUTES, 0 disables the periodic run
    pub static INTERVAL_MINUTES: Lazy<u64> = Lazy::new(|| {
        env::var("BACKUP_INTERVAL_MINUTES")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_INTERVAL_MINUTES)
    });

    /// Periodic backup interval, `None` when disabled
    pub fn interval() -> Option<Duration> {
        match *INTERVAL_MINUTES {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        }
    }
}

/// Read-path limits
pub mod limits {
    /// Number of participants shown by the `stats` CLI command
    pub const RECENT_PARTICIPANTS: usize = 20;
}
