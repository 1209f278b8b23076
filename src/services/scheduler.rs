//! Periodic fetch scheduler.
//!
//! Every tick picks the most overdue feed, stamps it as fetched and pulls its
//! content. Ticks run one at a time on the calling thread; a failed tick is
//! logged and the loop carries on with the next one.

use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::{Feed, FeedContent};
use crate::errors::{GatorError, GatorResult};
use crate::sources::FeedFetcher;
use crate::storage::traits::FeedRepository;

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// The feed store is empty.
    Idle,
    Fetched { feed: Feed, content: FeedContent },
    /// The feed was marked fetched but downloading or parsing it failed.
    FetchFailed { feed: Feed, error: GatorError },
}

/// Counters returned when a bounded run finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub fetched: u64,
    pub idle: u64,
    pub failed: u64,
}

/// Longest accepted polling interval, about 292 years.
pub const MAX_INTERVAL: Duration = Duration::from_nanos(i64::MAX as u64);

/// Fixed-rate timer. The first tick fires immediately; ticks missed while
/// the previous one was still running are dropped.
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.min(MAX_INTERVAL),
            next: Instant::now(),
        }
    }

    /// Block until the next deadline. Returns the number of ticks dropped.
    pub fn wait(&mut self) -> u32 {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        }

        if self.interval.is_zero() {
            self.next = Instant::now();
            return 0;
        }

        let now = Instant::now();
        let behind = now.saturating_duration_since(self.next);
        let elapsed_periods =
            u32::try_from(behind.as_nanos() / self.interval.as_nanos()).unwrap_or(u32::MAX);

        // Deadlines past what `Instant` can hold fall back to one interval from now.
        self.next = self
            .interval
            .checked_mul(elapsed_periods.saturating_add(1))
            .and_then(|step| self.next.checked_add(step))
            .or_else(|| now.checked_add(self.interval))
            .unwrap_or(now);
        elapsed_periods
    }
}

pub struct FetchScheduler<F: FeedRepository, S: FeedFetcher> {
    feeds: F,
    fetcher: S,
}

impl<F: FeedRepository, S: FeedFetcher> FetchScheduler<F, S> {
    pub fn new(feeds: F, fetcher: S) -> Self {
        Self { feeds, fetcher }
    }

    /// Run one fetch cycle.
    ///
    /// Storage failures come back as `Err`; a failed download is reported as
    /// [`TickOutcome::FetchFailed`] because the feed has already been stamped.
    pub fn tick(&self) -> GatorResult<TickOutcome> {
        let feed = match self.feeds.get_next_feed_to_fetch() {
            Ok(feed) => feed,
            Err(e) if e.is_not_found() => return Ok(TickOutcome::Idle),
            Err(e) => return Err(e),
        };

        let now = Utc::now();
        self.feeds.mark_feed_fetched(feed.id, now, now)?;
        let feed = Feed {
            updated_at: now,
            last_fetched_at: Some(now),
            ..feed
        };

        debug!(feed = %feed.name, url = %feed.url, "fetching feed");
        match self.fetcher.fetch(&feed.url) {
            Ok(content) => {
                info!(feed = %feed.name, items = content.items.len(), "fetched feed");
                for item in &content.items {
                    info!(feed = %feed.name, "{}", item.title);
                }
                Ok(TickOutcome::Fetched { feed, content })
            }
            Err(error) => Ok(TickOutcome::FetchFailed { feed, error }),
        }
    }

    /// Tick every `interval` until `max_ticks` have run, or forever when no
    /// limit is given.
    pub fn run(&self, interval: Duration, max_ticks: Option<u64>) -> RunStats {
        info!(
            interval = %humantime::format_duration(interval),
            "fetch scheduler started"
        );

        let mut ticker = Ticker::new(interval);
        let mut stats = RunStats::default();

        loop {
            if max_ticks.is_some_and(|max| stats.ticks >= max) {
                break;
            }

            let dropped = ticker.wait();
            if dropped > 0 {
                warn!(dropped, "fetch took longer than the interval; skipping missed ticks");
            }

            stats.ticks += 1;
            match self.tick() {
                Ok(TickOutcome::Idle) => {
                    stats.idle += 1;
                    warn!("no feeds to fetch; add one with `addfeed`");
                }
                Ok(TickOutcome::Fetched { .. }) => stats.fetched += 1,
                Ok(TickOutcome::FetchFailed { feed, error }) => {
                    stats.failed += 1;
                    error!(feed = %feed.name, url = %feed.url, "fetch failed: {}", error);
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("tick failed: {}", e);
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeedItem, User};
    use crate::sources::traits::MockFeedFetcher;
    use crate::storage::sqlite::{SqliteFeedRepository, SqliteStorage, SqliteUserRepository};
    use crate::storage::traits::{MockFeedRepository, UserRepository};
    use mockall::Sequence;

    fn content(title: &str) -> FeedContent {
        FeedContent {
            title: title.to_string(),
            items: vec![FeedItem::new(format!("{} post", title))],
            ..FeedContent::default()
        }
    }

    fn seeded_feeds(urls: &[&str]) -> SqliteFeedRepository {
        let storage = SqliteStorage::in_memory().unwrap();
        let owner = SqliteUserRepository::new(storage.clone())
            .create_user(&User::new("lane".to_string()))
            .unwrap();
        let feeds = SqliteFeedRepository::new(storage);
        for (i, url) in urls.iter().enumerate() {
            feeds
                .create_feed(&Feed::new(format!("Feed {}", i), url.to_string(), owner.id))
                .unwrap();
        }
        feeds
    }

    #[test]
    fn test_tick_on_empty_store_is_idle() {
        let mut fetcher = MockFeedFetcher::new();
        fetcher.expect_fetch().never();

        let scheduler = FetchScheduler::new(seeded_feeds(&[]), fetcher);
        assert!(matches!(scheduler.tick().unwrap(), TickOutcome::Idle));
    }

    #[test]
    fn test_ticks_visit_unfetched_feeds_in_creation_order() {
        let urls = ["http://a.example/rss", "http://b.example/rss", "http://c.example/rss"];

        let mut seq = Sequence::new();
        let mut fetcher = MockFeedFetcher::new();
        for url in urls {
            fetcher
                .expect_fetch()
                .withf(move |u| u == url)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|u| Ok(content(u)));
        }

        let scheduler = FetchScheduler::new(seeded_feeds(&urls), fetcher);
        for url in urls {
            match scheduler.tick().unwrap() {
                TickOutcome::Fetched { feed, content } => {
                    assert_eq!(feed.url, url);
                    assert!(feed.last_fetched_at.is_some());
                    assert_eq!(content.items.len(), 1);
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    }

    #[test]
    fn test_round_robin_wraps_to_oldest() {
        let urls = ["http://a.example/rss", "http://b.example/rss"];
        let mut fetcher = MockFeedFetcher::new();
        fetcher.expect_fetch().returning(|u| Ok(content(u)));

        let scheduler = FetchScheduler::new(seeded_feeds(&urls), fetcher);
        let visited: Vec<String> = (0..4)
            .map(|_| match scheduler.tick().unwrap() {
                TickOutcome::Fetched { feed, .. } => feed.url,
                other => panic!("unexpected outcome: {:?}", other),
            })
            .collect();

        assert_eq!(visited, vec![urls[0], urls[1], urls[0], urls[1]]);
    }

    #[test]
    fn test_fetch_failure_still_marks_feed() {
        let urls = ["http://a.example/rss", "http://b.example/rss"];
        let mut fetcher = MockFeedFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|u| u == "http://a.example/rss")
            .returning(|_| Err(GatorError::FeedParse("bad xml".to_string())));
        fetcher
            .expect_fetch()
            .withf(|u| u == "http://b.example/rss")
            .returning(|u| Ok(content(u)));

        let scheduler = FetchScheduler::new(seeded_feeds(&urls), fetcher);

        assert!(matches!(
            scheduler.tick().unwrap(),
            TickOutcome::FetchFailed { .. }
        ));
        // The failed feed moved to the back of the queue.
        match scheduler.tick().unwrap() {
            TickOutcome::Fetched { feed, .. } => assert_eq!(feed.url, "http://b.example/rss"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_storage_error_is_returned() {
        let mut feeds = MockFeedRepository::new();
        feeds
            .expect_get_next_feed_to_fetch()
            .returning(|| Err(GatorError::Database(rusqlite::Error::InvalidQuery)));
        feeds.expect_mark_feed_fetched().never();

        let mut fetcher = MockFeedFetcher::new();
        fetcher.expect_fetch().never();

        let scheduler = FetchScheduler::new(feeds, fetcher);
        assert!(matches!(scheduler.tick(), Err(GatorError::Database(_))));
    }

    #[test]
    fn test_run_survives_failing_ticks() {
        let mut feeds = MockFeedRepository::new();
        feeds
            .expect_get_next_feed_to_fetch()
            .times(3)
            .returning(|| Err(GatorError::Database(rusqlite::Error::InvalidQuery)));

        let scheduler = FetchScheduler::new(feeds, MockFeedFetcher::new());
        let stats = scheduler.run(Duration::from_millis(1), Some(3));

        assert_eq!(
            stats,
            RunStats {
                ticks: 3,
                fetched: 0,
                idle: 0,
                failed: 3
            }
        );
    }

    #[test]
    fn test_run_counts_outcomes() {
        let mut fetcher = MockFeedFetcher::new();
        fetcher.expect_fetch().returning(|u| Ok(content(u)));

        let scheduler = FetchScheduler::new(seeded_feeds(&["http://a.example/rss"]), fetcher);
        let stats = scheduler.run(Duration::from_millis(1), Some(2));

        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.fetched, 2);
    }

    #[test]
    fn test_run_on_empty_store_keeps_ticking() {
        let scheduler = FetchScheduler::new(seeded_feeds(&[]), MockFeedFetcher::new());
        let stats = scheduler.run(Duration::from_millis(1), Some(2));
        assert_eq!(stats.idle, 2);
    }

    #[test]
    fn test_ticker_first_tick_is_immediate() {
        let mut ticker = Ticker::new(Duration::from_secs(60));
        let start = Instant::now();
        assert_eq!(ticker.wait(), 0);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_ticker_waits_for_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(20));
        ticker.wait();
        ticker.wait();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_ticker_drops_missed_ticks() {
        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.wait();
        thread::sleep(Duration::from_millis(35));

        assert!(ticker.wait() >= 2);
    }

    #[test]
    fn test_ticker_with_huge_interval_does_not_overflow() {
        let mut ticker = Ticker::new(Duration::MAX);
        assert_eq!(ticker.interval, MAX_INTERVAL);
        assert_eq!(ticker.wait(), 0);
    }
}
