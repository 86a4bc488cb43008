//! OMDb search response parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

const IMDB_TITLE_URL: &str = "https://www.imdb.com/title";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbResponse {
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub search: Vec<OmdbTitle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
}

/// Parses an OMDb search response.
pub fn parse_omdb_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: OmdbResponse = decode_json(body)?;
    if !response.response.eq_ignore_ascii_case("true") {
        let error = response.error.unwrap_or_else(|| "unknown OMDb error".to_string());
        return if error.to_ascii_lowercase().contains("not found") {
            Err(ProviderError::EmptyResult)
        } else {
            Err(ProviderError::Upstream(error))
        };
    }

    let items = response
        .search
        .into_iter()
        .take(limit)
        .map(|t| {
            let title = match t.year {
                Some(year) => format!("{} ({year})", t.title),
                None => t.title,
            };
            ResultItem::new(title)
                .with_url(format!("{IMDB_TITLE_URL}/{}/", t.imdb_id))
                .with_snippet(t.kind.unwrap_or_default())
        })
        .collect();
    non_empty(ProviderData::from_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_results() {
        let body = ResponseBody::Text(
            r#"{"Response": "True", "totalResults": "1", "Search": [
                {"Title": "Inception", "Year": "2010", "imdbID": "tt1375666", "Type": "movie"}
            ]}"#
                .into(),
        );
        let data = parse_omdb_response(&body, 5).unwrap();
        assert_eq!(data.items[0].title, "Inception (2010)");
        assert_eq!(
            data.items[0].url.as_deref(),
            Some("https://www.imdb.com/title/tt1375666/")
        );
    }

    #[test]
    fn test_invalid_key_is_upstream() {
        let body = ResponseBody::Text(
            r#"{"Response": "False", "Error": "Invalid API key!"}"#.into(),
        );
        assert!(matches!(
            parse_omdb_response(&body, 5),
            Err(ProviderError::Upstream(_))
        ));
    }
}
