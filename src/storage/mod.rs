pub mod traits;
pub mod sqlite;

pub use traits::{FeedFollowRepository, FeedRepository, UserRepository};
pub use sqlite::{
    SqliteFeedFollowRepository, SqliteFeedRepository, SqliteStorage, SqliteUserRepository,
};
