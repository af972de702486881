//! Headlines: top stories from one NewsAPI source.

use super::http::with_query;
use super::{DataSource, FormatError, HttpClient, SourceError};
use crate::topic::Topic;
use serde::Deserialize;
use std::sync::Arc;

const TOP_HEADLINES_URL: &str = "https://newsapi.org/v2/top-headlines";

/// Number of headlines shown in the ticker.
pub const HEADLINE_COUNT: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopHeadlines {
    total_results: u64,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
}

/// Build the headlines line from article titles.
pub fn format_headlines<'a>(titles: impl IntoIterator<Item = &'a str>) -> String {
    let body = titles
        .into_iter()
        .map(|title| format!("{title}."))
        .collect::<Vec<_>>()
        .join("  ");
    format!("* Headlines *  {body}")
}

/// Headlines data source.
pub struct Headlines {
    client: Arc<dyn HttpClient>,
    source: String,
    api_key: String,
}

impl Headlines {
    /// Create a headlines source for a NewsAPI source id, e.g. `associated-press`.
    pub fn new(client: Arc<dyn HttpClient>, source: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            source: source.into(),
            api_key: api_key.into(),
        }
    }
}

impl DataSource for Headlines {
    fn topic(&self) -> Topic {
        Topic::Headlines
    }

    fn fetch(&mut self) -> Result<String, SourceError> {
        let url = with_query(
            TOP_HEADLINES_URL,
            &[("sources", self.source.as_str()), ("apiKey", self.api_key.as_str())],
        )?;
        let top: TopHeadlines = serde_json::from_value(self.client.get_json(&url)?)?;

        if top.total_results < HEADLINE_COUNT as u64 || top.articles.len() < HEADLINE_COUNT {
            return Err(FormatError(format!(
                "only {} headlines available from {}",
                top.articles.len(),
                self.source
            ))
            .into());
        }

        Ok(format_headlines(
            top.articles[..HEADLINE_COUNT].iter().map(|a| a.title.as_str()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::StubClient;
    use crate::source::Feed;
    use serde_json::json;

    fn headlines(titles: &[&str]) -> Headlines {
        let articles: Vec<_> = titles.iter().map(|t| json!({ "title": t })).collect();
        let body = json!({ "totalResults": titles.len(), "articles": articles });
        Headlines::new(
            Arc::new(StubClient::new().route(TOP_HEADLINES_URL, body)),
            "associated-press",
            "key",
        )
    }

    #[test]
    fn test_first_five_titles() {
        let mut source = headlines(&["One", "Two", "Three", "Four", "Five", "Six"]);
        assert_eq!(
            source.fetch().unwrap(),
            "* Headlines *  One.  Two.  Three.  Four.  Five."
        );
    }

    #[test]
    fn test_too_few_results_keeps_placeholder() {
        let mut feed = Feed::new(Box::new(headlines(&["One", "Two"])));
        assert_eq!(feed.refresh(), "No Headlines Data");
    }

    #[test]
    fn test_total_results_without_articles() {
        let body = json!({ "totalResults": 20, "articles": [{ "title": "Lonely" }] });
        let mut source = Headlines::new(
            Arc::new(StubClient::new().route(TOP_HEADLINES_URL, body)),
            "associated-press",
            "key",
        );
        assert!(matches!(source.fetch(), Err(SourceError::Format(_))));
    }

    #[test]
    fn test_source_and_key_cannot_add_parameters() {
        let client = Arc::new(StubClient::new().route(TOP_HEADLINES_URL, json!({})));
        let mut source = Headlines::new(client.clone(), "abc news&pageSize=1", "k#1");
        let _ = source.fetch();

        let requested = client.requested();
        let url = reqwest::Url::parse(&requested[0]).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("sources".to_string(), "abc news&pageSize=1".to_string()),
                ("apiKey".to_string(), "k#1".to_string()),
            ]
        );
        assert_eq!(url.fragment(), None);
    }
}
