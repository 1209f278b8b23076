use std::time::Duration;

use feed_rs::parser;
use reqwest::blocking::Client;

use crate::domain::{FeedContent, FeedItem};
use crate::errors::{GatorError, GatorResult};
use crate::sources::traits::FeedFetcher;
use crate::sources::validate_url;

const USER_AGENT: &str = concat!("gator/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RssAtomFetcher {
    client: Client,
}

impl RssAtomFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn parse_bytes(bytes: &[u8]) -> GatorResult<FeedContent> {
        let parsed = parser::parse(bytes).map_err(|e| GatorError::FeedParse(e.to_string()))?;

        let items = parsed
            .entries
            .into_iter()
            .map(|entry| {
                let title = entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string());
                let link = entry.links.into_iter().next().map(|l| l.href);
                let description = entry.summary.map(|s| s.content);
                let published_at = entry.published.or(entry.updated);

                FeedItem::new(title)
                    .with_link(link)
                    .with_description(description)
                    .with_published_at(published_at)
            })
            .collect();

        Ok(FeedContent {
            title: parsed
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled Feed".to_string()),
            link: parsed.links.into_iter().next().map(|l| l.href),
            description: parsed.description.map(|d| d.content),
            items,
        })
    }
}

impl Default for RssAtomFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedFetcher for RssAtomFetcher {
    fn fetch(&self, url: &str) -> GatorResult<FeedContent> {
        let url = validate_url(url)?;
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;

        Self::parse_bytes(&bytes)
    }
}
