pub mod traits;
pub mod rss_atom;

pub use traits::FeedFetcher;
pub use rss_atom::RssAtomFetcher;

use url::Url;

use crate::errors::{GatorError, GatorResult};

/// Reject anything that is not an absolute http(s) URL.
pub fn validate_url(url: &str) -> GatorResult<Url> {
    let parsed = Url::parse(url).map_err(|e| GatorError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(GatorError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            url, scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://blog.boot.dev/index.xml").is_ok());
        assert!(validate_url("http://x.com/rss").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com/feed"),
            Err(GatorError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(GatorError::InvalidUrl(_))
        ));
    }
}
