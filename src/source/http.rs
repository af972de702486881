//! Provider transport.

use super::FetchError;
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;

/// Identifies the clock to the providers; the NWS API rejects anonymous clients.
const USER_AGENT: &str = "marquee-clock (LED ticker)";

/// Append form-encoded query parameters to `base`.
pub(super) fn with_query(base: &str, params: &[(&str, &str)]) -> Result<String, FetchError> {
    Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|err| FetchError::Url(format!("{base}: {err}")))
}

/// Fetch a URL and parse its body as JSON.
///
/// Called from job threads only, so implementations may block.
pub trait HttpClient: Send + Sync {
    /// GET `url` and return the decoded JSON body.
    fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Blocking `reqwest` client shared by all sources.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    http: Client,
}

impl ReqwestClient {
    /// Build a client with the clock's user agent.
    pub fn new() -> Result<Self, FetchError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }
}

impl HttpClient for ReqwestClient {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.http.get(url).send()?.error_for_status()?;
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_values_are_encoded() {
        let url = with_query(
            "https://newsapi.org/v2/top-headlines",
            &[("sources", "abc news&pageSize=1"), ("apiKey", "k#1")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://newsapi.org/v2/top-headlines?sources=abc+news%26pageSize%3D1&apiKey=k%231"
        );
    }

    #[test]
    fn test_bad_base_is_a_fetch_error() {
        let err = with_query("not a url", &[("a", "b")]).unwrap_err();
        assert!(matches!(err, FetchError::Url(_)));
    }
}
