use clap::{Parser, Subcommand};

// Positional arguments are optional here so handlers can report their own
// usage line.
#[derive(Parser)]
#[command(name = "gator")]
#[command(about = "Command-line RSS feed aggregator")]
#[command(version)]
pub struct Cli {
    /// User to act as for follow-scoped commands
    #[arg(long, global = true, env = "GATOR_USER")]
    pub user: Option<String>,

    /// Path to the SQLite database
    #[arg(long, global = true, env = "GATOR_DB_PATH")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new user
    Register {
        /// User name
        name: Option<String>,
    },

    /// List registered users
    Users,

    /// Delete all users, feeds and follows
    Reset,

    /// Poll feeds forever, one feed per interval (e.g. 1m30s)
    Rss {
        /// Time between fetches, e.g. 30s, 1m30s, 1h
        duration: Option<String>,

        /// Stop after this many ticks instead of running forever
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Add a feed and follow it as the current user
    Addfeed {
        /// Display name of the feed
        name: Option<String>,

        /// Feed URL
        url: Option<String>,
    },

    /// List all feeds with their owners
    Feeds {
        /// Print the feeds as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow an existing feed by URL
    Follow {
        /// Feed URL
        url: Option<String>,
    },

    /// List feeds the current user follows
    Following,

    /// Stop following a feed by URL
    Unfollow {
        /// Feed URL
        url: Option<String>,
    },
}
