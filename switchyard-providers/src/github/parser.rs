//! GitHub repository search parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

#[derive(Debug, Deserialize)]
pub struct GitHubSearchResponse {
    #[serde(default)]
    pub items: Vec<GitHubRepo>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
}

/// Parses a repository search response.
pub fn parse_github_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: GitHubSearchResponse = decode_json(body)?;

    let items = response
        .items
        .into_iter()
        .take(limit)
        .map(|repo| {
            let mut parts = vec![format!("★ {}", repo.stargazers_count)];
            parts.extend(repo.language);
            parts.extend(repo.description.filter(|d| !d.trim().is_empty()));
            ResultItem::new(repo.full_name)
                .with_url(repo.html_url)
                .with_snippet(parts.join(" · "))
        })
        .collect();
    non_empty(ProviderData::from_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_without_description() {
        let body = ResponseBody::Text(
            r#"{"items": [{"full_name": "a/b", "html_url": "https://github.com/a/b", "stargazers_count": 3, "description": null, "language": null}]}"#
                .into(),
        );
        let data = parse_github_response(&body, 5).unwrap();
        assert_eq!(data.items[0].snippet.as_deref(), Some("★ 3"));
    }
}
