//! wttr.in `j1` response parser.
//!
//! Every value in the `j1` format is a string, and text fields are wrapped
//! in `[{"value": ...}]` lists.

use serde::Deserialize;
use switchyard_core::ProviderData;
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::decode_json;

#[derive(Debug, Deserialize)]
pub struct WttrResponse {
    #[serde(default)]
    pub current_condition: Vec<WttrCondition>,
    #[serde(default)]
    pub nearest_area: Vec<WttrArea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WttrCondition {
    #[serde(rename = "temp_C")]
    pub temp_c: String,
    #[serde(rename = "FeelsLikeC", default)]
    pub feels_like_c: Option<String>,
    #[serde(default)]
    pub humidity: Option<String>,
    #[serde(default)]
    pub windspeed_kmph: Option<String>,
    #[serde(default)]
    pub weather_desc: Vec<WttrValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WttrArea {
    #[serde(default)]
    pub area_name: Vec<WttrValue>,
    #[serde(default)]
    pub country: Vec<WttrValue>,
}

#[derive(Debug, Deserialize)]
pub struct WttrValue {
    pub value: String,
}

fn first(values: &[WttrValue]) -> Option<&str> {
    values.first().map(|v| v.value.trim()).filter(|v| !v.is_empty())
}

/// Parses a wttr.in `j1` response into a one-line summary.
pub fn parse_wttr_response(body: &ResponseBody) -> Result<ProviderData, ProviderError> {
    let response: WttrResponse = decode_json(body)?;
    let current = response
        .current_condition
        .first()
        .ok_or(ProviderError::EmptyResult)?;

    let place = response.nearest_area.first().and_then(|area| {
        match (first(&area.area_name), first(&area.country)) {
            (Some(name), Some(country)) => Some(format!("{name}, {country}")),
            (Some(name), None) => Some(name.to_string()),
            _ => None,
        }
    });

    let mut parts = Vec::new();
    if let Some(desc) = first(&current.weather_desc) {
        parts.push(desc.to_string());
    }
    let mut temp = format!("{}°C", current.temp_c);
    if let Some(feels) = &current.feels_like_c {
        temp.push_str(&format!(" (feels like {feels}°C)"));
    }
    parts.push(temp);
    if let Some(humidity) = &current.humidity {
        parts.push(format!("humidity {humidity}%"));
    }
    if let Some(wind) = &current.windspeed_kmph {
        parts.push(format!("wind {wind} km/h"));
    }

    let conditions = parts.join(", ");
    let summary = match place {
        Some(place) => format!("{place}: {conditions}"),
        None => conditions,
    };
    Ok(ProviderData::from_summary(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_current_condition() {
        let body = ResponseBody::Text(r#"{"current_condition": []}"#.into());
        assert!(matches!(parse_wttr_response(&body), Err(ProviderError::EmptyResult)));
    }

    #[test]
    fn test_without_area() {
        let body = ResponseBody::Text(r#"{"current_condition": [{"temp_C": "5"}]}"#.into());
        assert_eq!(
            parse_wttr_response(&body).unwrap().summary.as_deref(),
            Some("5°C")
        );
    }
}
