//! GNews response parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

#[derive(Debug, Deserialize)]
pub struct GNewsResponse {
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
    #[serde(default)]
    pub articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
pub struct GNewsArticle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
}

/// Parses a GNews response.
///
/// GNews reports errors as `{"errors": [...]}` or `{"errors": {...}}`.
pub fn parse_gnews_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: GNewsResponse = decode_json(body)?;
    if let Some(errors) = response.errors {
        return Err(ProviderError::Upstream(errors.to_string()));
    }

    let items = response
        .articles
        .into_iter()
        .take(limit)
        .map(|a| {
            ResultItem::new(a.title)
                .with_url(a.url)
                .with_snippet(a.description.unwrap_or_default())
        })
        .collect();
    non_empty(ProviderData::from_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_field() {
        let body = ResponseBody::Text(
            r#"{"errors": ["You have reached your request limit"]}"#.into(),
        );
        assert!(matches!(
            parse_gnews_response(&body, 5),
            Err(ProviderError::Upstream(msg)) if msg.contains("request limit")
        ));
    }
}
