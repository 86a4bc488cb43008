//! Algolia HN search parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
pub struct HnResponse {
    #[serde(default)]
    pub hits: Vec<HnHit>,
}

#[derive(Debug, Deserialize)]
pub struct HnHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub points: Option<u64>,
    #[serde(default)]
    pub num_comments: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Parses an Algolia HN search response.
///
/// Self posts have no URL and link to their discussion page instead.
pub fn parse_hackernews_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: HnResponse = decode_json(body)?;

    let items = response
        .hits
        .into_iter()
        .filter_map(|hit| {
            let title = hit.title.filter(|t| !t.is_empty())?;
            let url = hit
                .url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| format!("{ITEM_URL}{}", hit.object_id));
            let mut meta = Vec::new();
            if let Some(points) = hit.points {
                meta.push(format!("{points} points"));
            }
            if let Some(comments) = hit.num_comments {
                meta.push(format!("{comments} comments"));
            }
            if let Some(author) = hit.author {
                meta.push(format!("by {author}"));
            }
            Some(ResultItem::new(title).with_url(url).with_snippet(meta.join(" · ")))
        })
        .take(limit)
        .collect();
    non_empty(ProviderData::from_items(items))
}
