use tracing::{debug, info};

use crate::domain::{Feed, FeedFollow, FeedFollowDetails, FeedWithOwner, User};
use crate::errors::GatorResult;
use crate::sources::validate_url;
use crate::storage::traits::{FeedFollowRepository, FeedRepository};

/// Result of asking for a follow that may already exist.
#[derive(Debug, Clone)]
pub enum FollowOutcome {
    Created(FeedFollowDetails),
    AlreadyFollowing(FeedFollowDetails),
}

impl FollowOutcome {
    pub fn details(&self) -> &FeedFollowDetails {
        match self {
            FollowOutcome::Created(details) | FollowOutcome::AlreadyFollowing(details) => details,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, FollowOutcome::Created(_))
    }
}

/// Feed ownership and follow management.
pub struct FeedService<F: FeedRepository, FF: FeedFollowRepository> {
    feeds: F,
    follows: FF,
}

impl<F: FeedRepository, FF: FeedFollowRepository> FeedService<F, FF> {
    pub fn new(feeds: F, follows: FF) -> Self {
        Self { feeds, follows }
    }

    /// Add a feed owned by `user` and follow it on their behalf
    pub fn add(&self, user: &User, name: &str, url: &str) -> GatorResult<(Feed, FollowOutcome)> {
        validate_url(url)?;

        let feed = self
            .feeds
            .create_feed(&Feed::new(name.to_string(), url.to_string(), user.id))?;
        info!(feed = %feed.name, url = %feed.url, owner = %user.name, "created feed");

        let follow = self.ensure_follow(user, &feed)?;
        Ok((feed, follow))
    }

    /// List all feeds with their owners
    pub fn list(&self) -> GatorResult<Vec<FeedWithOwner>> {
        self.feeds.get_feeds()
    }

    /// Follow the feed registered under `url`
    pub fn follow(&self, user: &User, url: &str) -> GatorResult<FollowOutcome> {
        let feed = self.feeds.get_feed_by_url(url)?;
        self.ensure_follow(user, &feed)
    }

    /// Create the follow row unless the user already follows the feed.
    ///
    /// Both `addfeed` and `follow` go through here so a (user, feed) pair
    /// never gets a second row.
    pub fn ensure_follow(&self, user: &User, feed: &Feed) -> GatorResult<FollowOutcome> {
        if let Some(existing) = self.follows.get_feed_follow(user.id, feed.id)? {
            debug!(user = %user.name, feed = %feed.name, "follow already exists");
            return Ok(FollowOutcome::AlreadyFollowing(existing));
        }

        let details = self
            .follows
            .create_feed_follow(&FeedFollow::new(user.id, feed.id))?;
        info!(user = %details.user_name, feed = %details.feed_name, "created follow");
        Ok(FollowOutcome::Created(details))
    }

    /// Feeds the user follows, oldest follow first
    pub fn following(&self, user: &User) -> GatorResult<Vec<FeedFollowDetails>> {
        self.follows.get_feed_follows_for_user(user.id)
    }

    /// Stop following the feed at `url`. Returns the feed and whether a
    /// follow was actually removed.
    pub fn unfollow(&self, user: &User, url: &str) -> GatorResult<(Feed, bool)> {
        let feed = self.feeds.get_feed_by_url(url)?;
        let removed = self.follows.delete_feed_follow_by_user(user.id, feed.id)?;
        if removed > 0 {
            info!(user = %user.name, feed = %feed.name, "removed follow");
        }
        Ok((feed, removed > 0))
    }
}
