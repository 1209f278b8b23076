use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::domain::{Feed, FeedWithOwner};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::FeedRepository;

const FEED_COLUMNS: &str =
    "feeds.id, feeds.created_at, feeds.updated_at, feeds.name, feeds.url, feeds.user_id, feeds.last_fetched_at";

pub struct SqliteFeedRepository {
    storage: SqliteStorage,
}

impl SqliteFeedRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: row.get(0)?,
            created_at: row.get(1)?,
            updated_at: row.get(2)?,
            name: row.get(3)?,
            url: row.get(4)?,
            user_id: row.get(5)?,
            last_fetched_at: row.get(6)?,
        })
    }
}

impl FeedRepository for SqliteFeedRepository {
    fn create_feed(&self, feed: &Feed) -> GatorResult<Feed> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO feeds (id, created_at, updated_at, name, url, user_id, last_fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                &feed.id,
                &feed.created_at,
                &feed.updated_at,
                &feed.name,
                &feed.url,
                &feed.user_id,
                &feed.last_fetched_at,
            ),
        )
        .map_err(|e| GatorError::from_insert(e, format!("feed {}", feed.url)))?;

        Ok(feed.clone())
    }

    fn get_feeds(&self) -> GatorResult<Vec<FeedWithOwner>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_COLUMNS}, users.name FROM feeds
             JOIN users ON users.id = feeds.user_id
             ORDER BY feeds.rowid"
        ))?;

        let feeds = stmt.query_map([], |row| {
            Ok(FeedWithOwner {
                feed: Self::from_row(row)?,
                owner_name: row.get(7)?,
            })
        })?;

        feeds.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn get_feed_by_url(&self, url: &str) -> GatorResult<Feed> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?1"))?;

        match stmt.query_row([url], Self::from_row) {
            Ok(feed) => Ok(feed),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(GatorError::NotFound(format!("feed {}", url)))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_next_feed_to_fetch(&self) -> GatorResult<Feed> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds
             ORDER BY last_fetched_at ASC NULLS FIRST, rowid ASC
             LIMIT 1"
        ))?;

        match stmt.query_row([], Self::from_row) {
            Ok(feed) => Ok(feed),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(GatorError::NotFound("no feeds to fetch".to_string()))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn mark_feed_fetched(
        &self,
        id: Uuid,
        fetched_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        let changed = conn.execute(
            "UPDATE feeds SET last_fetched_at = ?1, updated_at = ?2 WHERE id = ?3",
            (&fetched_at, &updated_at, &id),
        )?;

        if changed == 0 {
            return Err(GatorError::NotFound(format!("feed id {}", id)));
        }
        Ok(())
    }
}
