//! Command handlers.
//!
//! Each handler checks its arguments, calls into the services and writes a
//! human-readable summary to `out`.

use std::io::Write;
use std::time::Duration;

use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::services::{FeedService, FetchScheduler, FollowOutcome, UserService, MAX_INTERVAL};
use crate::sources::FeedFetcher;
use crate::storage::traits::{FeedFollowRepository, FeedRepository, UserRepository};

pub const REGISTER_USAGE: &str = "Usage: register <name>";
pub const RSS_USAGE: &str = "Usage: rss <duration> (e.g. 30s, 1m30s, 1h)";
pub const ADDFEED_USAGE: &str = "Usage: addfeed <name> <url>";
pub const FOLLOW_USAGE: &str = "Usage: follow <url>";
pub const UNFOLLOW_USAGE: &str = "Usage: unfollow <url>";

/// Unwrap a positional argument or fail with the command's usage line.
pub fn required<'a>(arg: Option<&'a str>, usage: &str) -> GatorResult<&'a str> {
    match arg.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(GatorError::InvalidArgs(usage.to_string())),
    }
}

/// Parse a polling interval such as `1m30s`. Zero and anything above
/// [`MAX_INTERVAL`] are rejected.
pub fn parse_interval(arg: &str) -> GatorResult<Duration> {
    let interval = humantime::parse_duration(arg)
        .map_err(|e| GatorError::InvalidArgs(format!("{}: {}. {}", arg, e, RSS_USAGE)))?;

    if interval.is_zero() {
        return Err(GatorError::InvalidArgs(format!(
            "interval must be greater than zero. {}",
            RSS_USAGE
        )));
    }
    if interval > MAX_INTERVAL {
        return Err(GatorError::InvalidArgs(format!(
            "interval must be at most {}. {}",
            humantime::format_duration(MAX_INTERVAL),
            RSS_USAGE
        )));
    }
    Ok(interval)
}

pub fn register<R: UserRepository>(
    users: &UserService<R>,
    name: Option<&str>,
    out: &mut impl Write,
) -> GatorResult<()> {
    let name = required(name, REGISTER_USAGE)?;
    let user = users.register(name)?;

    writeln!(out, "User created: {}", user.name)?;
    writeln!(out, " - Id: {}", user.id)?;
    Ok(())
}

pub fn users<R: UserRepository>(
    users: &UserService<R>,
    current: Option<&str>,
    out: &mut impl Write,
) -> GatorResult<()> {
    let all = users.list()?;

    if all.is_empty() {
        writeln!(out, "No users registered.")?;
        return Ok(());
    }

    for user in all {
        if current == Some(user.name.as_str()) {
            writeln!(out, " * {} (current)", user.name)?;
        } else {
            writeln!(out, " * {}", user.name)?;
        }
    }
    Ok(())
}

pub fn reset<R: UserRepository>(users: &UserService<R>, out: &mut impl Write) -> GatorResult<()> {
    let removed = users.reset()?;
    writeln!(out, "Database reset. Removed {} users.", removed)?;
    Ok(())
}

pub fn rss<F: FeedRepository, S: FeedFetcher>(
    scheduler: &FetchScheduler<F, S>,
    duration: Option<&str>,
    max_ticks: Option<u64>,
    out: &mut impl Write,
) -> GatorResult<()> {
    let interval = parse_interval(required(duration, RSS_USAGE)?)?;

    writeln!(
        out,
        "Collecting feeds every {}",
        humantime::format_duration(interval)
    )?;
    out.flush()?;

    let stats = scheduler.run(interval, max_ticks);

    writeln!(
        out,
        "Stopped after {} ticks: {} fetched, {} idle, {} failed",
        stats.ticks, stats.fetched, stats.idle, stats.failed
    )?;
    Ok(())
}

pub fn add_feed<F: FeedRepository, FF: FeedFollowRepository>(
    feeds: &FeedService<F, FF>,
    user: &User,
    name: Option<&str>,
    url: Option<&str>,
    out: &mut impl Write,
) -> GatorResult<()> {
    let name = required(name, ADDFEED_USAGE)?;
    let url = required(url, ADDFEED_USAGE)?;

    let (feed, _) = feeds.add(user, name, url)?;

    writeln!(out, "User: {}", user.name)?;
    writeln!(out, "Feed created:")?;
    writeln!(out, " - Id: {}", feed.id)?;
    writeln!(out, " - Created: {}", feed.created_at)?;
    writeln!(out, " - Updated: {}", feed.updated_at)?;
    writeln!(out, " - Name: {}", feed.name)?;
    writeln!(out, " - Url: {}", feed.url)?;
    writeln!(out, " - User Id: {}", feed.user_id)?;
    Ok(())
}

pub fn feeds<F: FeedRepository, FF: FeedFollowRepository>(
    feeds: &FeedService<F, FF>,
    json: bool,
    out: &mut impl Write,
) -> GatorResult<()> {
    let all = feeds.list()?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &all)?;
        writeln!(out)?;
        return Ok(());
    }

    if all.is_empty() {
        writeln!(out, "No feeds found.")?;
        return Ok(());
    }

    for entry in all {
        writeln!(out, "Name: {}", entry.feed.name)?;
        writeln!(out, "Url: {}", entry.feed.url)?;
        writeln!(out, "User: {}", entry.owner_name)?;
        match entry.feed.last_fetched_at {
            Some(at) => writeln!(out, "Last fetched: {}", at)?,
            None => writeln!(out, "Last fetched: never")?,
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn follow<F: FeedRepository, FF: FeedFollowRepository>(
    feeds: &FeedService<F, FF>,
    user: &User,
    url: Option<&str>,
    out: &mut impl Write,
) -> GatorResult<()> {
    let url = required(url, FOLLOW_USAGE)?;

    match feeds.follow(user, url)? {
        FollowOutcome::Created(details) => writeln!(
            out,
            "{} is now following {}",
            details.user_name, details.feed_name
        )?,
        FollowOutcome::AlreadyFollowing(details) => writeln!(
            out,
            "{} is already following {}",
            details.user_name, details.feed_name
        )?,
    }
    Ok(())
}

pub fn following<F: FeedRepository, FF: FeedFollowRepository>(
    feeds: &FeedService<F, FF>,
    user: &User,
    out: &mut impl Write,
) -> GatorResult<()> {
    let follows = feeds.following(user)?;

    writeln!(out, "User: {}", user.name)?;
    if follows.is_empty() {
        writeln!(out, "Not following any feeds.")?;
    }
    for details in follows {
        writeln!(out, " - {}", details.feed_name)?;
    }
    Ok(())
}

pub fn unfollow<F: FeedRepository, FF: FeedFollowRepository>(
    feeds: &FeedService<F, FF>,
    user: &User,
    url: Option<&str>,
    out: &mut impl Write,
) -> GatorResult<()> {
    let url = required(url, UNFOLLOW_USAGE)?;

    let (feed, removed) = feeds.unfollow(user, url)?;
    if removed {
        writeln!(out, "{} unfollowed {}", user.name, feed.name)?;
    } else {
        writeln!(out, "{} was not following {}", user.name, feed.name)?;
    }
    Ok(())
}
