//! Alpha Vantage `GLOBAL_QUOTE` parser.

use serde::Deserialize;
use switchyard_core::ProviderData;
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::decode_json;

#[derive(Debug, Deserialize)]
pub struct AlphaVantageResponse {
    #[serde(rename = "Global Quote", default)]
    pub quote: Option<GlobalQuote>,
    #[serde(rename = "Note", default)]
    pub note: Option<String>,
    #[serde(rename = "Information", default)]
    pub information: Option<String>,
    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "05. price", default)]
    pub price: Option<String>,
    #[serde(rename = "07. latest trading day", default)]
    pub trading_day: Option<String>,
    #[serde(rename = "09. change", default)]
    pub change: Option<String>,
    #[serde(rename = "10. change percent", default)]
    pub change_percent: Option<String>,
}

fn number(raw: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse()
        .map_err(|_| ProviderError::Parse(format!("not a number: {raw:?}")))
}

/// Parses a `GLOBAL_QUOTE` response into a one-line summary.
pub fn parse_alphavantage_response(body: &ResponseBody) -> Result<ProviderData, ProviderError> {
    let response: AlphaVantageResponse = decode_json(body)?;
    if let Some(message) = response
        .error_message
        .or(response.note)
        .or(response.information)
    {
        return Err(ProviderError::Upstream(message));
    }

    // Unknown symbols come back as an empty quote object.
    let quote = response.quote.unwrap_or_default();
    let (Some(symbol), Some(price)) = (quote.symbol, quote.price) else {
        return Err(ProviderError::EmptyResult);
    };

    let mut summary = format!("{symbol}: {:.2}", number(&price)?);
    if let Some(change) = quote.change {
        let change = number(&change)?;
        match quote.change_percent {
            Some(percent) => summary.push_str(&format!(" ({change:+.2}, {percent})")),
            None => summary.push_str(&format!(" ({change:+.2})")),
        }
    }
    if let Some(day) = quote.trading_day {
        summary.push_str(&format!(" as of {day}"));
    }
    Ok(ProviderData::from_summary(summary))
}
