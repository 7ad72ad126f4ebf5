//! Core library for the `weather-forecast-mcp` server.
//!
//! This crate defines:
//! - Configuration of the server binding and upstream endpoints
//! - Abstractions over the geocoding and weather collaborators
//! - The query orchestrator behind the `get_weather_data` tool
//! - Shared domain models (locations, envelopes)
//!
//! It is used by `weather-forecast-mcp`, but can also be reused by other binaries or services.

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod service;
pub mod weather_code;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, EndpointsConfig, ServerConfig};
pub use error::WeatherError;
pub use model::{
    CurrentWeather, DateRange, ErrorEnvelope, HistoricalWeather, Location, LocationResult,
    QueryResponse, QueryType, WeatherReport,
};
pub use provider::{Geocoder, WeatherProvider, openmeteo::OpenMeteoProvider};
pub use service::WeatherService;
pub use weather_code::decode_weather_code;
