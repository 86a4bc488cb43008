//! DuckDuckGo Instant Answer parser.

use serde::Deserialize;
use switchyard_core::{ProviderData, ResultItem};
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::{decode_json, non_empty};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DuckDuckGoResponse {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    pub abstract_url: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub related_topics: Vec<DuckDuckGoTopic>,
}

/// A related topic, or a named group of topics.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DuckDuckGoTopic {
    Group {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Topics")]
        topics: Vec<DuckDuckGoTopic>,
    },
    Entry {
        #[serde(rename = "Text", default)]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
}

/// A flattened topic entry and the name of its enclosing group, if any.
struct RelatedTopic {
    text: String,
    url: String,
    group: Option<String>,
}

fn flatten(topics: Vec<DuckDuckGoTopic>, group: Option<&str>, out: &mut Vec<RelatedTopic>) {
    for topic in topics {
        match topic {
            DuckDuckGoTopic::Group { name, topics } => flatten(topics, Some(&name), out),
            DuckDuckGoTopic::Entry { text, first_url } if !text.is_empty() => {
                out.push(RelatedTopic {
                    text,
                    url: first_url,
                    group: group.map(str::to_string),
                });
            }
            DuckDuckGoTopic::Entry { .. } => {}
        }
    }
}

/// Parses an Instant Answer response.
pub fn parse_duckduckgo_response(
    body: &ResponseBody,
    limit: usize,
) -> Result<ProviderData, ProviderError> {
    let response: DuckDuckGoResponse = decode_json(body)?;

    let mut items = Vec::new();
    if !response.abstract_text.is_empty() {
        let title = if response.heading.is_empty() {
            response.abstract_text.clone()
        } else {
            response.heading.clone()
        };
        let mut item = ResultItem::new(title).with_snippet(response.abstract_text.clone());
        if !response.abstract_url.is_empty() {
            item = item.with_url(response.abstract_url.clone());
        }
        items.push(item);
    }

    let mut related = Vec::new();
    flatten(response.related_topics, None, &mut related);
    for topic in related {
        if items.len() >= limit {
            break;
        }
        // Topic text is "<title> - <description>" or just the title.
        let (title, snippet) = topic
            .text
            .split_once(" - ")
            .map_or((topic.text.as_str(), ""), |(t, s)| (t, s));
        let snippet = match topic.group.as_deref() {
            Some(group) if snippet.is_empty() => group,
            _ => snippet,
        };
        let mut item = ResultItem::new(title).with_snippet(snippet);
        if !topic.url.is_empty() {
            item = item.with_url(topic.url);
        }
        items.push(item);
    }

    let mut data = ProviderData::from_items(items);
    let summary = if response.answer.is_empty() {
        response.abstract_text
    } else {
        response.answer
    };
    if !summary.is_empty() {
        data = data.with_summary(summary);
    }
    non_empty(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_topics_are_flattened() {
        let body = ResponseBody::Text(
            r#"{"Heading": "", "AbstractText": "", "RelatedTopics": [
                {"Text": "Rust - a language", "FirstURL": "https://duckduckgo.com/Rust"},
                {"Name": "Games", "Topics": [
                    {"Text": "Rust (video game)", "FirstURL": "https://duckduckgo.com/Rust_game"}
                ]}
            ]}"#
                .into(),
        );
        let data = parse_duckduckgo_response(&body, 5).unwrap();
        assert_eq!(data.items.len(), 2);
        assert_eq!(data.items[0].title, "Rust");
        assert_eq!(data.items[0].snippet.as_deref(), Some("a language"));
        assert_eq!(data.items[1].title, "Rust (video game)");
        assert_eq!(data.items[1].snippet.as_deref(), Some("Games"));
        assert!(data.summary.is_none());
    }

    #[test]
    fn test_empty_answer() {
        let body = ResponseBody::Text(
            r#"{"Heading": "", "AbstractText": "", "RelatedTopics": []}"#.into(),
        );
        assert!(matches!(
            parse_duckduckgo_response(&body, 5),
            Err(ProviderError::EmptyResult)
        ));
    }
}
