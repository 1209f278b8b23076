use crate::domain::FeedContent;
use crate::errors::GatorResult;

/// Fetch-and-parse collaborator used by the scheduler.
#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher: Send + Sync {
    /// Download the document at `url` and parse it as RSS, Atom or JSON Feed.
    fn fetch(&self, url: &str) -> GatorResult<FeedContent>;
}
