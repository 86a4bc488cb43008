//! TMDB search response parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

const MOVIE_PAGE_URL: &str = "https://www.themoviedb.org/movie";

#[derive(Debug, Deserialize)]
pub struct TmdbResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// Formats "Title (Year)", or just the title when the date is missing.
pub(crate) fn title_with_year(title: &str, date: Option<&str>) -> String {
    match date.and_then(|d| d.get(..4)).filter(|y| y.chars().all(|c| c.is_ascii_digit())) {
        Some(year) => format!("{title} ({year})"),
        None => title.to_string(),
    }
}

/// Parses a TMDB movie search response.
pub fn parse_tmdb_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: TmdbResponse = decode_json(body)?;

    let items = response
        .results
        .into_iter()
        .take(limit)
        .map(|m| {
            let mut snippet = m.overview.unwrap_or_default();
            if let Some(vote) = m.vote_average.filter(|v| *v > 0.0) {
                snippet = format!("★ {vote:.1} · {snippet}");
            }
            ResultItem::new(title_with_year(&m.title, m.release_date.as_deref()))
                .with_url(format!("{MOVIE_PAGE_URL}/{}", m.id))
                .with_snippet(snippet.trim_end_matches([' ', '·']).to_string())
        })
        .collect();
    non_empty(ProviderData::from_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_with_year() {
        assert_eq!(title_with_year("Alien", Some("1979-05-25")), "Alien (1979)");
        assert_eq!(title_with_year("Alien", Some("")), "Alien");
        assert_eq!(title_with_year("Alien", None), "Alien");
    }

    #[test]
    fn test_rating_prefix() {
        let body = ResponseBody::Text(
            r#"{"results": [{"id": 1, "title": "Heat", "vote_average": 8.26, "overview": "Crime."}]}"#.into(),
        );
        let data = parse_tmdb_response(&body, 5).unwrap();
        assert_eq!(data.items[0].snippet.as_deref(), Some("★ 8.3 · Crime."));
    }

    #[test]
    fn test_no_results() {
        let body = ResponseBody::Text(r#"{"page": 1, "results": []}"#.into());
        assert!(matches!(parse_tmdb_response(&body, 5), Err(ProviderError::EmptyResult)));
    }
}
