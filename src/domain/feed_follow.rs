use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFollow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub feed_id: Uuid,
}

impl FeedFollow {
    pub fn new(user_id: Uuid, feed_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            user_id,
            feed_id,
        }
    }
}

/// A follow row with the user and feed names denormalized for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedFollowDetails {
    #[serde(flatten)]
    pub follow: FeedFollow,
    pub user_name: String,
    pub feed_name: String,
}
