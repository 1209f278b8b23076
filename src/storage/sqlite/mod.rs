mod connection;
mod user_repository;
mod feed_repository;
mod feed_follow_repository;

pub use connection::SqliteStorage;
pub use user_repository::SqliteUserRepository;
pub use feed_repository::SqliteFeedRepository;
pub use feed_follow_repository::SqliteFeedFollowRepository;
