//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Configuration summary logged at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// Never prints the token itself, only whether it is present.
pub fn log_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ BOT_TOKEN: not set");
    } else {
        log::info!("✅ BOT_TOKEN: set");
    }

    log::info!("🗄  DATABASE_PATH: {}", config::DATABASE_PATH.as_str());
    log::info!("📁 TEMP_FILES_DIR: {}", config::TEMP_FILES_DIR.as_str());

    if let Some(url) = config::BOT_API_URL.as_deref() {
        log::info!("🌐 BOT_API_URL: {}", url);
    }

    match *config::admin::ADMIN_USER_ID {
        0 => log::warn!("⚠️  ADMIN_USER_ID: not set, backups will not be delivered"),
        id => log::info!("👤 ADMIN_USER_ID: {}", id),
    }

    match config::backup::interval() {
        Some(interval) => log::info!("💾 Backup interval: {} min", interval.as_secs() / 60),
        None => log::info!("💾 Periodic backup disabled (BACKUP_INTERVAL_MINUTES=0)"),
    }
}
