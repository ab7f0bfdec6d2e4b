use anyhow::Result;
use chrono::Local;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use etriathlon::cli::{Cli, Commands};
use etriathlon::core::backup::{start_backup_scheduler, BackupJob};
use etriathlon::core::{config, init_logger, log_configuration};
use etriathlon::registration::{RegistrationEngine, SessionStore};
use etriathlon::storage::export;
use etriathlon::storage::{create_pool, ParticipantStore, SqliteParticipantStore};
use etriathlon::telegram::notifications::{notify_admin_startup, start_backup_notifier};
use etriathlon::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Log panics from handler tasks before they unwind
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env before any config static is read
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::Export { output }) => run_export(output),
        Some(Commands::Stats { limit }) => run_stats(limit),
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

fn open_store() -> Result<Arc<SqliteParticipantStore>> {
    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    Ok(Arc::new(SqliteParticipantStore::new(db_pool)))
}

/// Writes a backup CSV from the database without Telegram
fn run_export(output: Option<PathBuf>) -> Result<()> {
    let store = open_store()?;
    let now = Local::now();
    let path = output.unwrap_or_else(|| PathBuf::from(export::backup_file_name(now)));

    let count = export::export_to_file(store.as_ref(), &path, now)?;
    println!("Exported {} participants to {}", count, path.display());
    Ok(())
}

/// Prints per-discipline counts and the latest registrations
fn run_stats(limit: usize) -> Result<()> {
    let store = open_store()?;
    let all = store.list_all()?;

    println!("{}: {} registrations", config::TOURNAMENT_NAME, all.len());
    for (discipline, count) in export::discipline_counts(&all) {
        println!("  {:<13} {}", discipline.display_name(), count);
    }

    let recent = store.list_recent(limit)?;
    if !recent.is_empty() {
        println!("\nLatest {}:", recent.len());
        for participant in recent {
            let created_at = participant
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!(
                "  {}  {} ({})  {}",
                created_at,
                participant.full_name(),
                participant.class_label,
                export::format_disciplines(&participant)
            );
        }
    }

    Ok(())
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    log_configuration();

    let store: Arc<dyn ParticipantStore> = open_store()?;
    let bot = create_bot()?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    // Backup job: writes CSV files, the notifier delivers them
    let backup_job = Arc::new(BackupJob::new(Arc::clone(&store), config::TEMP_FILES_DIR.as_str()));
    let (backup_handle, backup_events) = start_backup_scheduler(backup_job, config::backup::interval());
    start_backup_notifier(bot.clone(), backup_events);

    let sessions = Arc::new(SessionStore::new());
    let engine = Arc::new(RegistrationEngine::new(sessions, store));
    let deps = HandlerDeps::new(engine, backup_handle);

    notify_admin_startup(&bot).await;
    log::info!("✅ Bot started, waiting for updates");

    let listener = Polling::builder(bot.clone()).build();
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
