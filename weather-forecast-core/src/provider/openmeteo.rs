use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::{Config, EndpointsConfig},
    provider::{
        CURRENT_FIELDS, CurrentResponse, DAILY_FIELDS, DailyResponse, GeocodingMatch,
        PRECIPITATION_UNIT, TEMPERATURE_UNIT, WIND_SPEED_UNIT,
    },
};

use super::{Geocoder, WeatherProvider};

/// Client for the Open-Meteo geocoding, forecast and archive APIs.
///
/// No API key is needed. One `reqwest::Client` is shared by all three
/// endpoints and its default timeouts apply.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    endpoints: EndpointsConfig,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(endpoints: EndpointsConfig) -> Self {
        Self {
            endpoints,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoints.clone())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        debug!(url, what, "sending Open-Meteo request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse Open-Meteo {what} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingMatch>>,
}

#[async_trait]
impl Geocoder for OpenMeteoProvider {
    async fn search(&self, city_name: &str) -> Result<Vec<GeocodingMatch>> {
        let query = [
            ("name", city_name.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let parsed: OmGeocodingResponse = self
            .get_json(&self.endpoints.geocoding_url, &query, "geocoding")
            .await?;

        Ok(parsed.results.unwrap_or_default())
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentResponse> {
        let mut query = coordinates(latitude, longitude);
        query.push(("current", CURRENT_FIELDS.join(",")));
        query.extend(metric_units());

        self.get_json(&self.endpoints.forecast_url, &query, "current weather")
            .await
    }

    async fn archive(
        &self,
        latitude: f64,
        longitude: f64,
        start_date: &str,
        end_date: &str,
    ) -> Result<DailyResponse> {
        let mut query = coordinates(latitude, longitude);
        query.push(("start_date", start_date.to_string()));
        query.push(("end_date", end_date.to_string()));
        query.push(("daily", DAILY_FIELDS.join(",")));
        query.extend(metric_units());

        self.get_json(&self.endpoints.archive_url, &query, "archive")
            .await
    }
}

fn coordinates(latitude: f64, longitude: f64) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", latitude.to_string()),
        ("longitude", longitude.to_string()),
    ]
}

fn metric_units() -> [(&'static str, String); 3] {
    [
        ("temperature_unit", TEMPERATURE_UNIT.to_string()),
        ("wind_speed_unit", WIND_SPEED_UNIT.to_string()),
        ("precipitation_unit", PRECIPITATION_UNIT.to_string()),
    ]
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
