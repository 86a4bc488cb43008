//! OpenWeatherMap response parser.

use serde::Deserialize;
use switchyard_core::ProviderData;
use switchyard_fetch::ResponseBody;

use crate::error::ProviderError;
use crate::provider::decode_json;

#[derive(Debug, Deserialize)]
pub struct OwmResponse {
    pub name: String,
    #[serde(default)]
    pub sys: Option<OwmSys>,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    pub main: OwmMain,
    #[serde(default)]
    pub wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
pub struct OwmSys {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwmCondition {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct OwmWind {
    pub speed: f64,
}

/// Parses an OpenWeatherMap current-weather response into a one-line summary.
pub fn parse_openweathermap_response(body: &ResponseBody) -> Result<ProviderData, ProviderError> {
    let response: OwmResponse = decode_json(body)?;

    let place = match response.sys.and_then(|s| s.country) {
        Some(country) => format!("{}, {country}", response.name),
        None => response.name,
    };
    let conditions = response
        .weather
        .iter()
        .map(|w| w.description.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut summary = format!("{place}: ");
    if !conditions.is_empty() {
        summary.push_str(&conditions);
        summary.push_str(", ");
    }
    summary.push_str(&format!("{:.1}°C", response.main.temp));
    if let Some(feels) = response.main.feels_like {
        summary.push_str(&format!(" (feels like {feels:.1}°C)"));
    }
    if let Some(humidity) = response.main.humidity {
        summary.push_str(&format!(", humidity {humidity}%"));
    }
    if let Some(wind) = response.wind {
        summary.push_str(&format!(", wind {:.1} m/s", wind.speed));
    }

    Ok(ProviderData::from_summary(summary))
}
