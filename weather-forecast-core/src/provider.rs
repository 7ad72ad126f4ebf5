use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Debug;

pub mod openmeteo;

/// Instantaneous fields requested for current conditions.
pub const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation",
    "rain",
    "snowfall",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
];

/// Daily aggregates requested for historical ranges.
pub const DAILY_FIELDS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "apparent_temperature_mean",
    "sunrise",
    "sunset",
    "precipitation_sum",
    "rain_sum",
    "snowfall_sum",
    "precipitation_hours",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
    "shortwave_radiation_sum",
];

pub const TEMPERATURE_UNIT: &str = "celsius";
pub const WIND_SPEED_UNIT: &str = "kmh";
pub const PRECIPITATION_UNIT: &str = "mm";

/// One entry of a geocoding search result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodingMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
}

/// `current` block and its units, passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentResponse {
    pub current: Map<String, Value>,
    #[serde(default)]
    pub current_units: Map<String, Value>,
}

/// `daily` block and its units, passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyResponse {
    pub daily: Map<String, Value>,
    #[serde(default)]
    pub daily_units: Map<String, Value>,
}

/// Resolves place names to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Best matches for `city_name`, best first. An empty list means no match.
    async fn search(&self, city_name: &str) -> anyhow::Result<Vec<GeocodingMatch>>;
}

/// Serves weather observations for a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, latitude: f64, longitude: f64) -> anyhow::Result<CurrentResponse>;

    /// Daily aggregates between two `YYYY-MM-DD` dates, passed through unvalidated.
    async fn archive(
        &self,
        latitude: f64,
        longitude: f64,
        start_date: &str,
        end_date: &str,
    ) -> anyhow::Result<DailyResponse>;
}
