pub mod user;
pub mod feed;
pub mod feed_follow;
pub mod content;

pub use user::User;
pub use feed::{Feed, FeedWithOwner};
pub use feed_follow::{FeedFollow, FeedFollowDetails};
pub use content::{FeedContent, FeedItem};
