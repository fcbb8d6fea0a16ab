//! Weather Tool
//!
//! Current temperature for a city: geocode the location, resolve the
//! weather.gov forecast office for the coordinates, then read the first
//! forecast period.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use genui_core::{
    ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolOutput, ToolSchema,
};

use crate::credentials::CredentialSource;
use crate::error::{Result, ToolError};
use crate::model::WeatherReport;

pub const WEATHER_DATA: &str = "weather-data";

const GEOCODE_FAILED: &str = "Failed to get geocode data.";
const POINTS_FAILED: &str = "Failed to get weather data.";
const FORECAST_FAILED: &str = "Failed to get forecast data.";

/// Weather endpoint settings
#[derive(Clone, Debug)]
pub struct WeatherConfig {
    pub geocode_base: String,
    pub weather_base: String,
    /// Name of the credential holding the geocoding key
    pub key_var: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocode_base: "https://geocode.xyz".into(),
            weather_base: "https://api.weather.gov".into(),
            key_var: "GEOCODE_API_KEY".into(),
        }
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    latt: Value,
    longt: Value,
}

#[derive(Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Deserialize)]
struct PointsProperties {
    forecast: String,
}

#[derive(Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Deserialize)]
struct ForecastPeriod {
    temperature: serde_json::Number,
}

/// Which hop of the lookup failed
#[derive(Debug)]
enum Stage {
    Geocode,
    Points,
    Forecast,
}

impl Stage {
    const fn message(&self) -> &'static str {
        match self {
            Self::Geocode => GEOCODE_FAILED,
            Self::Points => POINTS_FAILED,
            Self::Forecast => FORECAST_FAILED,
        }
    }
}

/// geocode.xyz returns coordinates as strings; accept numbers too
fn coordinate(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tool for looking up current weather
pub struct WeatherDataTool {
    http: Client,
    config: WeatherConfig,
    credentials: Arc<dyn CredentialSource>,
}

impl WeatherDataTool {
    pub fn new(config: WeatherConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            http: Client::new(),
            config,
            credentials,
        }
    }

    fn url(base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base).map_err(|e| ToolError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ToolError::Url(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/geo+json, application/json")
            .header("User-Agent", concat!("genui-tools/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn geocode(&self, key: &str, city: &str, state: &str, country: &str) -> Result<(String, String)> {
        let location = format!("{city},{state},{country}").to_lowercase();
        let mut url = Self::url(&self.config.geocode_base, &[location.as_str()])?;
        url.query_pairs_mut()
            .append_pair("json", "1")
            .append_pair("auth", key);

        let data: GeocodeResponse = self.get_json(url).await?;
        match (coordinate(&data.latt), coordinate(&data.longt)) {
            (Some(latt), Some(longt)) => Ok((latt, longt)),
            _ => Err(ToolError::Decode("geocode response has no coordinates".into())),
        }
    }

    async fn lookup(
        &self,
        key: &str,
        city: &str,
        state: &str,
        country: &str,
    ) -> std::result::Result<WeatherReport, (Stage, ToolError)> {
        let (latt, longt) = self
            .geocode(key, city, state, country)
            .await
            .map_err(|e| (Stage::Geocode, e))?;

        let coordinates = format!("{latt},{longt}");
        let points_url = Self::url(&self.config.weather_base, &["points", coordinates.as_str()])
            .map_err(|e| (Stage::Points, e))?;
        let points: PointsResponse = self
            .get_json(points_url)
            .await
            .map_err(|e| (Stage::Points, e))?;

        let forecast_url = Url::parse(&points.properties.forecast)
            .map_err(|e| (Stage::Forecast, ToolError::Url(e.to_string())))?;
        let forecast: ForecastResponse = self
            .get_json(forecast_url)
            .await
            .map_err(|e| (Stage::Forecast, e))?;

        let current = forecast.properties.periods.into_iter().next().ok_or_else(|| {
            (Stage::Forecast, ToolError::Decode("forecast has no periods".into()))
        })?;

        Ok(WeatherReport {
            city: city.to_string(),
            state: state.to_string(),
            country: country.to_string(),
            temperature: current.temperature,
        })
    }
}

#[async_trait]
impl Tool for WeatherDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: WEATHER_DATA.into(),
            description: "Get the current temperature for a city.".into(),
            parameters: vec![
                ParameterSchema::required("city", "string", "The city name to get weather for"),
                ParameterSchema::required(
                    "state",
                    "string",
                    "The two letter state abbreviation to get weather for",
                ),
                ParameterSchema::optional(
                    "country",
                    "string",
                    "The two letter country abbreviation to get weather for",
                )
                .with_default(json!("usa")),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolOutput> {
        let key = self.credentials.require(&self.config.key_var)?;

        let city = call.str_arg("city").unwrap_or_default();
        let state = call.str_arg("state").unwrap_or_default();
        let country = call.str_arg("country").unwrap_or("usa");

        match self.lookup(&key, city, state, country).await {
            Ok(report) => Ok(ToolOutput::Data(serde_json::to_value(report)?)),
            Err((stage, e)) => {
                tracing::warn!(city, state, country, ?stage, error = %e, "Weather lookup failed");
                Ok(ToolOutput::message(stage.message()))
            }
        }
    }
}
