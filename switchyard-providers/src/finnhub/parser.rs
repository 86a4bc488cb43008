//! Finnhub quote parser.

use serde::Deserialize;
use switchyard_core::ProviderData;
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::decode_json;

#[derive(Debug, Deserialize)]
pub struct FinnhubQuote {
    /// Current price.
    #[serde(default)]
    pub c: f64,
    /// Change.
    #[serde(default)]
    pub d: Option<f64>,
    /// Percent change.
    #[serde(default)]
    pub dp: Option<f64>,
    /// Day high.
    #[serde(default)]
    pub h: Option<f64>,
    /// Day low.
    #[serde(default)]
    pub l: Option<f64>,
}

/// Parses a quote for `ticker`.
///
/// Finnhub answers unknown symbols with all-zero fields.
pub fn parse_finnhub_response(
    ticker: &str,
    body: &ResponseBody,
) -> Result<ProviderData, ProviderError> {
    let quote: FinnhubQuote = decode_json(body)?;
    if quote.c.abs() < f64::EPSILON {
        return Err(ProviderError::EmptyResult);
    }

    let mut summary = format!("{ticker}: {:.2}", quote.c);
    if let (Some(change), Some(percent)) = (quote.d, quote.dp) {
        summary.push_str(&format!(" ({change:+.2}, {percent:+.2}%)"));
    }
    if let (Some(low), Some(high)) = (quote.l, quote.h) {
        summary.push_str(&format!(", day range {low:.2}-{high:.2}"));
    }
    Ok(ProviderData::from_summary(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_symbol_is_empty() {
        let body = ResponseBody::Text(r#"{"c": 0, "d": null, "dp": null, "h": 0, "l": 0}"#.into());
        assert!(matches!(
            parse_finnhub_response("ZZZZ", &body),
            Err(ProviderError::EmptyResult)
        ));
    }
}
