use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{convert::TryFrom, fmt};

use crate::error::WeatherError;

/// Best geocoding match for a city name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country: String,
    /// First-level administrative region, empty when the geocoder has none.
    pub region: String,
}

/// Location block embedded in every weather envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LocationResult> for Location {
    fn from(r: LocationResult) -> Self {
        Self {
            city: r.name,
            country: r.country,
            region: r.region,
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: Location,
    pub current: Map<String, Value>,
    pub units: Map<String, Value>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalWeather {
    pub location: Location,
    pub date_range: DateRange,
    pub daily: Map<String, Value>,
    pub units: Map<String, Value>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherReport {
    Current(CurrentWeather),
    Historical(HistoricalWeather),
}

impl WeatherReport {
    pub fn location(&self) -> &Location {
        match self {
            WeatherReport::Current(c) => &c.location,
            WeatherReport::Historical(h) => &h.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub city_name: String,
    pub query_type: String,
}

/// Everything the entry point can hand back: a report or an error envelope,
/// never anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Success(WeatherReport),
    Failure(ErrorEnvelope),
}

impl QueryResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResponse::Failure(_))
    }

    /// Render as 2-space indented JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|err| {
            let fallback = serde_json::json!({
                "error": format!("Failed to serialize response: {err}"),
            });
            fallback.to_string()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Current,
    Historical,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Current => "current",
            QueryType::Historical => "historical",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for QueryType {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "current" => Ok(QueryType::Current),
            "historical" => Ok(QueryType::Historical),
            _ => Err(WeatherError::InvalidQueryType(value.to_string())),
        }
    }
}
