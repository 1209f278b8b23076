use std::io;

use clap::Parser;

use gator::cli::{handlers, Cli, Commands};
use gator::config::Config;
use gator::domain::User;
use gator::errors::GatorResult;
use gator::logging;
use gator::services::{FeedService, FetchScheduler, UserService};
use gator::sources::RssAtomFetcher;
use gator::storage::sqlite::{
    SqliteFeedFollowRepository, SqliteFeedRepository, SqliteStorage, SqliteUserRepository,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> GatorResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?.with_overrides(cli.db.clone(), cli.user.clone());
    logging::init(&config.log_level);

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)?;
    let users = UserService::new(SqliteUserRepository::new(storage.clone()));
    let feeds = FeedService::new(
        SqliteFeedRepository::new(storage.clone()),
        SqliteFeedFollowRepository::new(storage.clone()),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Register { name } => handlers::register(&users, name.as_deref(), &mut out),
        Commands::Users => handlers::users(&users, config.current_user.as_deref(), &mut out),
        Commands::Reset => handlers::reset(&users, &mut out),
        Commands::Rss {
            duration,
            max_ticks,
        } => {
            let scheduler =
                FetchScheduler::new(SqliteFeedRepository::new(storage), RssAtomFetcher::new());
            handlers::rss(&scheduler, duration.as_deref(), max_ticks, &mut out)
        }
        Commands::Addfeed { name, url } => {
            let user = resolve_user(&config, &users)?;
            handlers::add_feed(&feeds, &user, name.as_deref(), url.as_deref(), &mut out)
        }
        Commands::Feeds { json } => handlers::feeds(&feeds, json, &mut out),
        Commands::Follow { url } => {
            let user = resolve_user(&config, &users)?;
            handlers::follow(&feeds, &user, url.as_deref(), &mut out)
        }
        Commands::Following => {
            let user = resolve_user(&config, &users)?;
            handlers::following(&feeds, &user, &mut out)
        }
        Commands::Unfollow { url } => {
            let user = resolve_user(&config, &users)?;
            handlers::unfollow(&feeds, &user, url.as_deref(), &mut out)
        }
    }
}

/// Look up the user named by `--user` / `GATOR_USER`.
fn resolve_user(config: &Config, users: &UserService<SqliteUserRepository>) -> GatorResult<User> {
    let name = config.require_user()?;
    users.get(name)
}
