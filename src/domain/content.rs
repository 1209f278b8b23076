use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parsed body of a fetched feed. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedContent {
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    pub fn new(title: String) -> Self {
        Self {
            title,
            link: None,
            description: None,
            published_at: None,
        }
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }
}
