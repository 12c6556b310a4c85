//! Identifier extraction from intercepted request URLs.

use http::Uri;
use tracing::trace;

/// Trait for extracting the content identifier from a player request URL.
///
/// The two "nothing to do" outcomes are kept apart:
/// - `None`: no identifier in the URL (malformed or unrecognized request)
/// - `Some("")`: the request carries an identifier that is intentionally blank
pub trait IdentifierParser: Send + Sync {
    /// Extract the identifier from `url`.
    fn parse_identifier(&self, url: &str) -> Option<String>;
}

impl<T> IdentifierParser for std::sync::Arc<T>
where
    T: IdentifierParser + ?Sized,
{
    fn parse_identifier(&self, url: &str) -> Option<String> {
        self.as_ref().parse_identifier(url)
    }
}

/// Reads the identifier from a query parameter, `id` by default.
///
/// # Example
/// ```
/// use stream_override_core::{IdentifierParser, QueryIdParser};
///
/// let parser = QueryIdParser::default();
/// assert_eq!(
///     parser.parse_identifier("https://host/youtubei/v1/player?id=abc123&t=1"),
///     Some("abc123".to_string()),
/// );
/// assert_eq!(parser.parse_identifier("https://host/player?id="), Some(String::new()));
/// assert_eq!(parser.parse_identifier("https://host/player"), None);
/// ```
#[derive(Debug, Clone)]
pub struct QueryIdParser {
    param: &'static str,
}

impl QueryIdParser {
    /// Creates a parser reading the given query parameter.
    pub const fn new(param: &'static str) -> Self {
        Self { param }
    }
}

impl Default for QueryIdParser {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdentifierParser for QueryIdParser {
    fn parse_identifier(&self, url: &str) -> Option<String> {
        let uri: Uri = match url.parse() {
            Ok(uri) => uri,
            Err(err) => {
                trace!(%url, error = %err, "Request url is not a valid uri");
                return None;
            }
        };
        let query = uri.query()?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
        pairs
            .into_iter()
            .find(|(name, _)| name == self.param)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_id_param() {
        let parser = QueryIdParser::default();
        assert_eq!(
            parser.parse_identifier("https://www.youtube.com/youtubei/v1/player?key=k&id=abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_blank_id_is_distinct_from_missing() {
        let parser = QueryIdParser::default();
        assert_eq!(parser.parse_identifier("https://host/player?id="), Some(String::new()));
        assert_eq!(parser.parse_identifier("https://host/player?key=k"), None);
        assert_eq!(parser.parse_identifier("https://host/player"), None);
    }

    #[test]
    fn test_malformed_url() {
        let parser = QueryIdParser::default();
        assert_eq!(parser.parse_identifier("not a url at all"), None);
    }

    #[test]
    fn test_custom_param() {
        let parser = QueryIdParser::new("v");
        assert_eq!(
            parser.parse_identifier("https://host/watch?v=xyz"),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn test_percent_decoding() {
        let parser = QueryIdParser::default();
        assert_eq!(
            parser.parse_identifier("https://host/player?id=a%2Db"),
            Some("a-b".to_string())
        );
    }
}
