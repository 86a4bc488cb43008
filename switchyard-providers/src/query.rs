//! Query text helpers shared by providers that need a structured argument
//! (a location for weather, a ticker for quotes) rather than free text.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ProviderError;

/// Words dropped when a weather query has no "in <place>" clause.
const WEATHER_WORDS: &[&str] = &[
    "weather", "forecast", "temperature", "raining", "snowing", "humidity", "what's", "whats",
    "what", "is", "the", "like", "current", "today", "tomorrow", "tonight", "now", "in", "at",
    "for", "how", "hot", "cold",
];

/// All-caps tokens that are never tickers.
const TICKER_STOPWORDS: &[&str] = &[
    "A", "I", "THE", "AND", "OR", "OF", "FOR", "IN", "ON", "AT", "TO", "IS", "USD", "EUR", "CEO",
    "ETF", "IPO", "NYSE", "NASDAQ", "DOW",
];

/// Words dropped when looking for a lowercase ticker.
const STOCK_WORDS: &[&str] = &[
    "stock", "stocks", "share", "shares", "price", "quote", "ticker", "of", "for", "the", "what",
    "is", "today", "market", "cap", "earnings", "dividend", "nasdaq", "nyse", "current", "how",
    "doing",
];

static LOCATION_RE: OnceLock<Option<Regex>> = OnceLock::new();
static CASHTAG_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn location_re() -> Option<&'static Regex> {
    LOCATION_RE
        .get_or_init(|| {
            Regex::new(
                r"(?i)\b(?:in|at|for)\s+(.+?)\s*(?:\b(?:today|tomorrow|tonight|right now|now|this week)\b)?[?.!]*$",
            )
            .ok()
        })
        .as_ref()
}

fn cashtag_re() -> Option<&'static Regex> {
    CASHTAG_RE
        .get_or_init(|| Regex::new(r"\$([A-Za-z]{1,5})\b").ok())
        .as_ref()
}

fn trim_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
}

/// Removes every word in `words` (case-insensitive) and joins the rest.
pub fn strip_words(query: &str, words: &[&str]) -> String {
    query
        .split_whitespace()
        .map(trim_punctuation)
        .filter(|w| !w.is_empty() && !words.iter().any(|s| s.eq_ignore_ascii_case(w)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts a place name from a weather query.
///
/// "weather in Paris today?" yields `Paris`; "Berlin forecast" yields
/// `Berlin`.
///
/// # Errors
///
/// [`ProviderError::InvalidQuery`] if nothing resembling a place remains.
pub fn extract_location(query: &str) -> Result<String, ProviderError> {
    let from_clause = location_re()
        .and_then(|re| re.captures(query.trim()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_end_matches(['?', '.', '!', ',']).to_string())
        .filter(|s| !s.is_empty());

    let location = from_clause.unwrap_or_else(|| strip_words(query, WEATHER_WORDS));
    if location.is_empty() {
        Err(ProviderError::InvalidQuery(format!(
            "no location found in {query:?}"
        )))
    } else {
        Ok(location)
    }
}

/// Extracts a stock ticker from a query.
///
/// Tries, in order: a `$TICKER` cashtag, an all-caps token of 1-5 letters,
/// then a single leftover word once stock vocabulary is removed.
///
/// # Errors
///
/// [`ProviderError::InvalidQuery`] if no ticker can be identified.
pub fn extract_ticker(query: &str) -> Result<String, ProviderError> {
    if let Some(tag) = cashtag_re()
        .and_then(|re| re.captures(query))
        .and_then(|caps| caps.get(1))
    {
        return Ok(tag.as_str().to_ascii_uppercase());
    }

    let caps_token = query.split_whitespace().map(trim_punctuation).find(|w| {
        (1..=5).contains(&w.len())
            && w.chars().all(|c| c.is_ascii_uppercase())
            && !TICKER_STOPWORDS.contains(&w)
    });
    if let Some(token) = caps_token {
        return Ok(token.to_string());
    }

    let rest = strip_words(query, STOCK_WORDS);
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None)
            if (1..=5).contains(&word.len()) && word.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            Ok(word.to_ascii_uppercase())
        }
        _ => Err(ProviderError::InvalidQuery(format!(
            "no ticker found in {query:?}"
        ))),
    }
}
