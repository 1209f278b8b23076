pub mod user_service;
pub mod feed_service;
pub mod scheduler;

pub use user_service::UserService;
pub use feed_service::{FeedService, FollowOutcome};
pub use scheduler::{FetchScheduler, RunStats, TickOutcome, Ticker, MAX_INTERVAL};
