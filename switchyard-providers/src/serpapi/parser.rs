//! SerpApi response parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

#[derive(Debug, Deserialize)]
pub struct SerpApiResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub answer_box: Option<SerpApiAnswerBox>,
    #[serde(default)]
    pub organic_results: Vec<SerpApiResult>,
}

#[derive(Debug, Deserialize)]
pub struct SerpApiAnswerBox {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SerpApiResult {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Parses a SerpApi response.
pub fn parse_serpapi_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: SerpApiResponse = decode_json(body)?;
    if let Some(error) = response.error {
        return Err(ProviderError::Upstream(error));
    }

    let items = response
        .organic_results
        .into_iter()
        .take(limit)
        .map(|r| {
            let mut item = ResultItem::new(r.title).with_snippet(r.snippet.unwrap_or_default());
            if let Some(link) = r.link {
                item = item.with_url(link);
            }
            item
        })
        .collect();

    let mut data = ProviderData::from_items(items);
    if let Some(answer) = response.answer_box.and_then(|b| b.answer.or(b.snippet)) {
        data = data.with_summary(answer);
    }
    non_empty(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_box_becomes_summary() {
        let body = ResponseBody::Text(
            r#"{"answer_box": {"answer": "1.85"}, "organic_results": []}"#.into(),
        );
        let data = parse_serpapi_response(&body, 5).unwrap();
        assert_eq!(data.summary.as_deref(), Some("1.85"));
        assert!(data.items.is_empty());
    }

    #[test]
    fn test_no_results() {
        let body = ResponseBody::Text(r#"{"organic_results": []}"#.into());
        assert!(matches!(
            parse_serpapi_response(&body, 5),
            Err(ProviderError::EmptyResult)
        ));
    }
}
