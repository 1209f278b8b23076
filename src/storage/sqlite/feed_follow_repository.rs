use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::{FeedFollow, FeedFollowDetails};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::FeedFollowRepository;

const DETAILS_QUERY: &str = "
    SELECT ff.id, ff.created_at, ff.updated_at, ff.user_id, ff.feed_id, users.name, feeds.name
    FROM feed_follows ff
    JOIN users ON users.id = ff.user_id
    JOIN feeds ON feeds.id = ff.feed_id";

pub struct SqliteFeedFollowRepository {
    storage: SqliteStorage,
}

impl SqliteFeedFollowRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<FeedFollowDetails> {
        Ok(FeedFollowDetails {
            follow: FeedFollow {
                id: row.get(0)?,
                created_at: row.get(1)?,
                updated_at: row.get(2)?,
                user_id: row.get(3)?,
                feed_id: row.get(4)?,
            },
            user_name: row.get(5)?,
            feed_name: row.get(6)?,
        })
    }

    // Takes the already-locked connection so create can read back its own row.
    fn find(
        conn: &Connection,
        user_id: Uuid,
        feed_id: Uuid,
    ) -> GatorResult<Option<FeedFollowDetails>> {
        let mut stmt = conn.prepare(&format!(
            "{DETAILS_QUERY} WHERE ff.user_id = ?1 AND ff.feed_id = ?2"
        ))?;
        Ok(stmt
            .query_row((&user_id, &feed_id), Self::from_row)
            .optional()?)
    }
}

impl FeedFollowRepository for SqliteFeedFollowRepository {
    fn create_feed_follow(&self, follow: &FeedFollow) -> GatorResult<FeedFollowDetails> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &follow.id,
                &follow.created_at,
                &follow.updated_at,
                &follow.user_id,
                &follow.feed_id,
            ),
        )
        .map_err(|e| {
            GatorError::from_insert(
                e,
                format!("follow of feed {} by user {}", follow.feed_id, follow.user_id),
            )
        })?;

        Self::find(&conn, follow.user_id, follow.feed_id)?.ok_or_else(|| {
            GatorError::NotFound(format!("follow {}", follow.id))
        })
    }

    fn get_feed_follow(
        &self,
        user_id: Uuid,
        feed_id: Uuid,
    ) -> GatorResult<Option<FeedFollowDetails>> {
        let conn = self.storage.connection()?;
        Self::find(&conn, user_id, feed_id)
    }

    fn get_feed_follows_for_user(&self, user_id: Uuid) -> GatorResult<Vec<FeedFollowDetails>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "{DETAILS_QUERY} WHERE ff.user_id = ?1 ORDER BY ff.rowid"
        ))?;

        let follows = stmt.query_map([&user_id], Self::from_row)?;
        follows.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn delete_feed_follow_by_user(&self, user_id: Uuid, feed_id: Uuid) -> GatorResult<usize> {
        let conn = self.storage.connection()?;
        let removed = conn.execute(
            "DELETE FROM feed_follows WHERE user_id = ?1 AND feed_id = ?2",
            (&user_id, &feed_id),
        )?;
        Ok(removed)
    }
}
