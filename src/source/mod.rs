//! Data sources: fetch from a provider, format a fixed-style status string.
//!
//! - [`DataSource`]: one provider-specific fetch-and-format operation
//! - [`Feed`]: wraps a source and never fails, falling back to the last good string
//! - [`HttpClient`]: the provider transport, [`ReqwestClient`] in production
//!
//! Every failure (network, malformed body, missing field) stays inside the
//! feed that produced it; the ticker keeps showing the last good value.

mod http;
pub mod headlines;
pub mod market;
pub mod weather;

pub use headlines::Headlines;
pub use http::{HttpClient, ReqwestClient};
pub use market::Market;
pub use weather::Weather;

use crate::topic::Topic;
use thiserror::Error;

/// Failure to obtain a response from a provider.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with a non-success status.
    #[error("provider returned status {0}")]
    Status(u16),

    /// Body was not valid JSON.
    #[error("malformed response: {0}")]
    Parse(String),

    /// The request URL could not be built.
    #[error("invalid request url: {0}")]
    Url(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Response parsed but did not have the expected shape or fields.
#[derive(Debug, Error)]
#[error("unexpected response: {0}")]
pub struct FormatError(pub String);

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

/// Anything that can go wrong inside a single refresh.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport or decoding failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Missing or unexpected fields.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.into())
    }
}

/// A provider-specific fetch-and-format operation for one topic.
pub trait DataSource: Send {
    /// The topic this source feeds.
    fn topic(&self) -> Topic;

    /// Fetch from the provider and format one status string.
    fn fetch(&mut self) -> Result<String, SourceError>;
}

/// A data source plus the last string it produced successfully.
///
/// [`Feed::refresh`] never fails: on error it logs and returns the previous
/// good string, or the topic's "No Data" placeholder.
pub struct Feed {
    source: Box<dyn DataSource>,
    last_good: Option<String>,
}

impl Feed {
    /// Wrap a data source.
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            last_good: None,
        }
    }

    /// The topic of the wrapped source.
    #[inline]
    pub fn topic(&self) -> Topic {
        self.source.topic()
    }

    /// Fetch and format, falling back to the retained value on any failure.
    pub fn refresh(&mut self) -> String {
        let topic = self.topic();
        match self.source.fetch() {
            Ok(text) => {
                tracing::debug!(%topic, %text, "refreshed");
                self.last_good = Some(text.clone());
                text
            }
            Err(err) => {
                tracing::warn!(%topic, error = %err, "refresh failed, keeping last value");
                self.last_good
                    .clone()
                    .unwrap_or_else(|| topic.no_data().to_string())
            }
        }
    }
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("topic", &self.topic())
            .field("last_good", &self.last_good)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;

    #[test]
    fn test_feed_placeholder_before_success() {
        let mut feed = Feed::new(Box::new(ScriptedSource::always_failing(Topic::Weather)));
        assert_eq!(feed.refresh(), "No Weather Data");
        assert_eq!(feed.refresh(), "No Weather Data");
    }

    #[test]
    fn test_feed_keeps_last_good_value() {
        let mut feed = Feed::new(Box::new(ScriptedSource::new(
            Topic::Market,
            vec![Ok("first"), Err("timeout"), Ok("second"), Err("bad json")],
        )));

        assert_eq!(feed.refresh(), "first");
        assert_eq!(feed.refresh(), "first");
        assert_eq!(feed.refresh(), "second");
        assert_eq!(feed.refresh(), "second");
    }

    #[test]
    fn test_error_messages() {
        let err: SourceError = FormatError("missing field `name`".into()).into();
        assert!(err.to_string().contains("missing field"));

        let err: SourceError = FetchError::Status(503).into();
        assert_eq!(err.to_string(), "provider returned status 503");
    }
}
