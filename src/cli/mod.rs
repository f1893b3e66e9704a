pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedline")]
#[command(about = "Collects syndication feeds and serves them as a day-grouped timeline", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/feedline/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file, overrides the configuration
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Account the command acts on
    #[arg(short, long, default_value_t = 1, global = true)]
    pub user: i64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to a feed
    Add {
        /// Display name of the feed
        name: String,
        /// URL of the feed
        url: String,
    },
    /// Unsubscribe from a feed and drop its entries
    Remove {
        /// Id of the feed source
        id: i64,
    },
    /// Change the name and URL of a feed
    Rename {
        id: i64,
        name: String,
        url: String,
    },
    /// List subscribed feeds
    Sources,
    /// Import subscriptions from a JSON file
    Import {
        /// File of the form {"feeds": [{"name": ..., "url": ...}]}
        path: PathBuf,
    },
    /// Print subscriptions as JSON
    Export,
    /// Fetch all feeds of the user
    Refresh,
    /// Show one page of the timeline
    Page {
        /// Days back from today where the page ends
        #[arg(short, long, default_value_t = 0)]
        offset: u32,

        /// Do not refresh before showing the first page
        #[arg(long)]
        no_refresh: bool,
    },
}
