//! Brave Search response parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

#[derive(Debug, Deserialize)]
pub struct BraveResponse {
    #[serde(default)]
    pub web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
pub struct BraveWeb {
    #[serde(default)]
    pub results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
pub struct BraveResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Parses a Brave web search response.
pub fn parse_brave_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: BraveResponse = decode_json(body)?;
    let results = response.web.map(|w| w.results).unwrap_or_default();
    debug!(count = results.len(), "Parsed Brave results");

    let items = results
        .into_iter()
        .take(limit)
        .map(|r| {
            ResultItem::new(r.title)
                .with_url(r.url)
                .with_snippet(r.description.unwrap_or_default())
        })
        .collect();
    non_empty(ProviderData::from_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_brave() {
        let body = ResponseBody::Text(
            r#"{"web": {"results": [
                {"title": "Rust", "url": "https://www.rust-lang.org", "description": "A language"},
                {"title": "Crates", "url": "https://crates.io"}
            ]}}"#
                .into(),
        );
        let data = parse_brave_response(&body, 5).unwrap();
        assert_eq!(data.items.len(), 2);
        assert_eq!(data.items[0].snippet.as_deref(), Some("A language"));
        assert!(data.items[1].snippet.is_none());
    }

    #[test]
    fn test_parse_brave_respects_limit() {
        let body = ResponseBody::Text(
            r#"{"web": {"results": [
                {"title": "a", "url": "https://a"}, {"title": "b", "url": "https://b"}
            ]}}"#
                .into(),
        );
        assert_eq!(parse_brave_response(&body, 1).unwrap().items.len(), 1);
    }
}
