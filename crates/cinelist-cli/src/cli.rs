use std::path::PathBuf;

use clap::{Parser, Subcommand};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Parser)]
#[command(name = "cinelist", author, version, about = "Search movies and keep a rated watchlist", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Keep the watchlist in memory instead of the database
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog by title
    Search { query: String },
    /// Show details for one catalog id
    Show { id: String },
    /// Rate a movie and add it to the watchlist
    Add {
        id: String,
        /// Rating from 1 to 10
        #[arg(short, long)]
        rating: u8,
    },
    /// Remove a movie from the watchlist
    Remove { id: String },
    /// List watched movies
    List,
    /// Print watchlist averages
    Summary,
    /// Interactive search and rate session
    Browse,
    /// Print the config file path
    Config {
        /// Save the effective config to that path
        #[arg(long)]
        write: bool,
    },
}

impl CliArgs {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref level) = self.log_level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    level,
                    LOG_LEVELS.join(", ")
                ));
            }
        }

        if let Command::Add { rating, .. } = self.command {
            if !(1..=10).contains(&rating) {
                return Err(format!("rating must be between 1 and 10, got {rating}"));
            }
        }

        Ok(())
    }
}
