use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Feed, FeedFollow, FeedFollowDetails, FeedWithOwner, User};
use crate::errors::GatorResult;

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn create_user(&self, user: &User) -> GatorResult<User>;
    fn get_user_by_name(&self, name: &str) -> GatorResult<User>;
    fn get_users(&self) -> GatorResult<Vec<User>>;
    /// Delete every user; feeds and follows go with them.
    fn reset(&self) -> GatorResult<usize>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedRepository: Send + Sync {
    fn create_feed(&self, feed: &Feed) -> GatorResult<Feed>;
    fn get_feeds(&self) -> GatorResult<Vec<FeedWithOwner>>;
    fn get_feed_by_url(&self, url: &str) -> GatorResult<Feed>;
    /// The most overdue feed: oldest `last_fetched_at`, never-fetched first.
    fn get_next_feed_to_fetch(&self) -> GatorResult<Feed>;
    fn mark_feed_fetched(
        &self,
        id: Uuid,
        fetched_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> GatorResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedFollowRepository: Send + Sync {
    fn create_feed_follow(&self, follow: &FeedFollow) -> GatorResult<FeedFollowDetails>;
    fn get_feed_follow(&self, user_id: Uuid, feed_id: Uuid)
        -> GatorResult<Option<FeedFollowDetails>>;
    fn get_feed_follows_for_user(&self, user_id: Uuid) -> GatorResult<Vec<FeedFollowDetails>>;
    /// Returns the number of rows removed; zero is not an error.
    fn delete_feed_follow_by_user(&self, user_id: Uuid, feed_id: Uuid) -> GatorResult<usize>;
}
