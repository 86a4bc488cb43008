//! NewsAPI response parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
pub struct NewsApiArticle {
    #[serde(default)]
    pub source: Option<NewsApiSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsApiSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Parses a NewsAPI response.
pub fn parse_newsapi_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: NewsApiResponse = decode_json(body)?;
    if response.status != "ok" {
        return Err(ProviderError::Upstream(
            response.message.unwrap_or(response.status),
        ));
    }

    let items = response
        .articles
        .into_iter()
        // Removed articles come back with the title "[Removed]".
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.is_empty() && t != "[Removed]")?;
            let source = a.source.and_then(|s| s.name);
            let snippet = match (source, a.description) {
                (Some(source), Some(desc)) => format!("{source}: {desc}"),
                (None, Some(desc)) => desc,
                (Some(source), None) => source,
                (None, None) => String::new(),
            };
            let mut item = ResultItem::new(title).with_snippet(snippet);
            if let Some(url) = a.url {
                item = item.with_url(url);
            }
            Some(item)
        })
        .take(limit)
        .collect();
    non_empty(ProviderData::from_items(items))
}
