use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "etriathlon-bot")]
#[command(author, version, about = "Telegram registration bot for the eTriathlon 2026 school tournament", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Write a CSV backup of all registrations without starting the bot
    Export {
        /// Output file (defaults to backup_etriathlon_<timestamp>.csv in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print registration counts per discipline and the latest registrations
    Stats {
        /// Number of latest registrations to list
        #[arg(short, long, default_value_t = crate::core::config::limits::RECENT_PARTICIPANTS)]
        limit: usize,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
