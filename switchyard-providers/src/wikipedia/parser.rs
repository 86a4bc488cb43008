//! MediaWiki search response parser.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

const ARTICLE_URL: &str = "https://en.wikipedia.org/wiki/";

static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();

#[derive(Debug, Deserialize)]
pub struct WikiResponse {
    #[serde(default)]
    pub query: Option<WikiQuery>,
    #[serde(default)]
    pub error: Option<WikiError>,
}

#[derive(Debug, Deserialize)]
pub struct WikiQuery {
    #[serde(default)]
    pub search: Vec<WikiHit>,
}

#[derive(Debug, Deserialize)]
pub struct WikiHit {
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
pub struct WikiError {
    #[serde(default)]
    pub info: String,
}

/// Removes HTML tags and decodes the few entities MediaWiki emits.
pub(crate) fn strip_html(html: &str) -> String {
    let text = match TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").ok()) {
        Some(re) => re.replace_all(html, "").into_owned(),
        None => html.to_string(),
    };
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Parses a `list=search` response.
pub fn parse_wikipedia_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: WikiResponse = decode_json(body)?;
    if let Some(error) = response.error {
        return Err(ProviderError::Upstream(error.info));
    }

    let items = response
        .query
        .map(|q| q.search)
        .unwrap_or_default()
        .into_iter()
        .take(limit)
        .map(|hit| {
            let url = format!("{ARTICLE_URL}{}", hit.title.replace(' ', "_"));
            ResultItem::new(hit.title)
                .with_url(url)
                .with_snippet(strip_html(&hit.snippet))
        })
        .collect();
    non_empty(ProviderData::from_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html(r#"the <span class="searchmatch">Rust</span> &quot;book&quot; &amp; more"#),
            r#"the Rust "book" & more"#
        );
    }

    #[test]
    fn test_api_error() {
        let body = ResponseBody::Text(
            r#"{"error": {"code": "nosrsearch", "info": "The \"srsearch\" parameter must be set."}}"#.into(),
        );
        assert!(matches!(
            parse_wikipedia_response(&body, 5),
            Err(ProviderError::Upstream(_))
        ));
    }
}
