//! Query orchestration behind the `get_weather_data` tool.
//!
//! Each call is independent: resolve the city, hit one weather endpoint,
//! wrap the result. Nothing is cached or shared between calls.

use chrono::{Duration, NaiveDateTime};
use std::{convert::TryFrom, sync::Arc};
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock, iso_timestamp},
    config::Config,
    error::WeatherError,
    model::{
        CurrentWeather, DateRange, ErrorEnvelope, HistoricalWeather, Location, LocationResult,
        QueryResponse, QueryType, WeatherReport,
    },
    provider::{Geocoder, WeatherProvider, openmeteo::OpenMeteoProvider},
    resolver::resolve_location,
};

pub const DEFAULT_QUERY_TYPE: &str = "current";

#[derive(Debug, Clone)]
pub struct WeatherService {
    geocoder: Arc<dyn Geocoder>,
    provider: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        provider: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geocoder,
            provider,
            clock,
        }
    }

    /// Service backed by Open-Meteo for both hops and the system clock.
    pub fn open_meteo(config: &Config) -> Self {
        let om = Arc::new(OpenMeteoProvider::from_config(config));
        Self::new(om.clone(), om, Arc::new(SystemClock))
    }

    async fn locate(&self, city_name: &str) -> Result<LocationResult, WeatherError> {
        resolve_location(self.geocoder.as_ref(), city_name)
            .await?
            .ok_or_else(|| WeatherError::CityNotFound(city_name.to_string()))
    }

    pub async fn fetch_current(&self, city_name: &str) -> Result<CurrentWeather, WeatherError> {
        let location = self.locate(city_name).await?;

        let data = self
            .provider
            .current(location.latitude, location.longitude)
            .await
            .map_err(|e| WeatherError::weather_fetch(&e))?;

        Ok(CurrentWeather {
            location: Location::from(location),
            current: data.current,
            units: data.current_units,
            timestamp: iso_timestamp(self.clock.now()),
        })
    }

    /// Daily history for `city_name`.
    ///
    /// A missing (or empty) `end_date` defaults to yesterday and a missing
    /// `start_date` to 30 days before today. Both are measured from now, so a
    /// caller-supplied end does not move the default start.
    pub async fn fetch_historical(
        &self,
        city_name: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<HistoricalWeather, WeatherError> {
        let location = self.locate(city_name).await?;

        let date_range = default_date_range(self.clock.now(), start_date, end_date);
        debug!(start = %date_range.start, end = %date_range.end, "historical date range");

        let data = self
            .provider
            .archive(
                location.latitude,
                location.longitude,
                &date_range.start,
                &date_range.end,
            )
            .await
            .map_err(|e| WeatherError::historical_fetch(&e))?;

        Ok(HistoricalWeather {
            location: Location::from(location),
            date_range,
            daily: data.daily,
            units: data.daily_units,
            timestamp: iso_timestamp(self.clock.now()),
        })
    }

    async fn dispatch(
        &self,
        city_name: &str,
        query_type: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<WeatherReport, WeatherError> {
        match QueryType::try_from(query_type)? {
            QueryType::Current => self.fetch_current(city_name).await.map(WeatherReport::Current),
            QueryType::Historical => self
                .fetch_historical(city_name, start_date, end_date)
                .await
                .map(WeatherReport::Historical),
        }
    }

    /// Entry point of the tool. Every failure is folded into an
    /// [`ErrorEnvelope`]; this never returns an error.
    pub async fn get_weather_data(
        &self,
        city_name: &str,
        query_type: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> QueryResponse {
        let query_type = query_type.unwrap_or(DEFAULT_QUERY_TYPE);
        info!(city_name, query_type, "weather data query");

        match self
            .dispatch(city_name, query_type, start_date, end_date)
            .await
        {
            Ok(report) => QueryResponse::Success(report),
            Err(err) => {
                warn!(city_name, query_type, error = %err, "weather data query failed");
                QueryResponse::Failure(ErrorEnvelope {
                    error: err.to_string(),
                    city_name: city_name.to_string(),
                    query_type: query_type.to_string(),
                })
            }
        }
    }

    /// [`get_weather_data`](Self::get_weather_data) rendered as pretty JSON.
    pub async fn get_weather_data_json(
        &self,
        city_name: &str,
        query_type: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> String {
        self.get_weather_data(city_name, query_type, start_date, end_date)
            .await
            .to_json_pretty()
    }
}

/// Apply the historical date defaults relative to `now`.
pub fn default_date_range(
    now: NaiveDateTime,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> DateRange {
    let given = |d: Option<&str>| d.filter(|s| !s.is_empty()).map(str::to_string);

    let end = given(end_date).unwrap_or_else(|| format_date(now - Duration::days(1)));
    let start = given(start_date).unwrap_or_else(|| format_date(now - Duration::days(30)));

    DateRange { start, end }
}

fn format_date(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        provider::{CurrentResponse, DailyResponse, GeocodingMatch},
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{Value, json};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        matches: Vec<GeocodingMatch>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, _city_name: &str) -> anyhow::Result<Vec<GeocodingMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("geocoder unavailable");
            }
            Ok(self.matches.clone())
        }
    }

    #[derive(Debug, Default)]
    struct FakeWeather {
        fail: bool,
        calls: AtomicUsize,
        last_range: Mutex<Option<(String, String)>>,
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn current(&self, _lat: f64, _lon: f64) -> anyhow::Result<CurrentResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("status 502");
            }
            Ok(CurrentResponse {
                current: obj(json!({"time": "2024-03-15T10:00", "temperature_2m": 9.8})),
                current_units: obj(json!({"temperature_2m": "°C"})),
            })
        }

        async fn archive(
            &self,
            _lat: f64,
            _lon: f64,
            start_date: &str,
            end_date: &str,
        ) -> anyhow::Result<DailyResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_range.lock().unwrap() = Some((start_date.into(), end_date.into()));
            if self.fail {
                anyhow::bail!("Parameter 'start_date' is invalid");
            }
            Ok(DailyResponse {
                daily: obj(json!({"time": [start_date, end_date]})),
                daily_units: obj(json!({"time": "iso8601"})),
            })
        }
    }

    fn obj(v: Value) -> serde_json::Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn london() -> GeocodingMatch {
        GeocodingMatch {
            latitude: 51.50853,
            longitude: -0.12574,
            name: "London".into(),
            country: Some("United Kingdom".into()),
            admin1: Some("England".into()),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn service(geocoder: Arc<FakeGeocoder>, weather: Arc<FakeWeather>) -> WeatherService {
        WeatherService::new(geocoder, weather, Arc::new(FixedClock(now())))
    }

    fn found() -> Arc<FakeGeocoder> {
        Arc::new(FakeGeocoder {
            matches: vec![london()],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn current_envelope_embeds_location_and_raw_block() {
        let svc = service(found(), Arc::new(FakeWeather::default()));

        let report = svc.fetch_current("London").await.unwrap();

        assert_eq!(report.location.city, "London");
        assert_eq!(report.location.region, "England");
        assert_eq!(report.current["temperature_2m"], 9.8);
        assert_eq!(report.units["temperature_2m"], "°C");
        assert_eq!(report.timestamp, "2024-03-15T10:00:00.000000");
    }

    #[tokio::test]
    async fn unknown_city_names_the_city() {
        let weather = Arc::new(FakeWeather::default());
        let svc = service(Arc::new(FakeGeocoder::default()), weather.clone());

        let resp = svc.get_weather_data("Nowhere123xyz", None, None, None).await;

        let QueryResponse::Failure(env) = resp else {
            panic!("expected error envelope");
        };
        assert!(env.error.contains("Nowhere123xyz"));
        assert_eq!(env.query_type, "current");
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_query_type_skips_all_collaborators() {
        let geocoder = found();
        let weather = Arc::new(FakeWeather::default());
        let svc = service(geocoder.clone(), weather.clone());

        let resp = svc.get_weather_data("London", Some("Forecast"), None, None).await;

        assert_eq!(
            resp,
            QueryResponse::Failure(ErrorEnvelope {
                error: "Invalid query_type: Forecast. Must be 'current' or 'historical'".into(),
                city_name: "London".into(),
                query_type: "Forecast".into(),
            })
        );
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn query_type_dispatch_ignores_case() {
        let svc = service(found(), Arc::new(FakeWeather::default()));

        let resp = svc.get_weather_data("London", Some("HISTORICAL"), None, None).await;

        assert!(matches!(resp, QueryResponse::Success(WeatherReport::Historical(_))));
    }

    #[tokio::test]
    async fn historical_defaults_both_dates_from_now() {
        let weather = Arc::new(FakeWeather::default());
        let svc = service(found(), weather.clone());

        let report = svc.fetch_historical("London", None, None).await.unwrap();

        assert_eq!(report.date_range.end, "2024-03-14");
        assert_eq!(report.date_range.start, "2024-02-14");
        assert_eq!(
            *weather.last_range.lock().unwrap(),
            Some(("2024-02-14".to_string(), "2024-03-14".to_string()))
        );
    }

    #[tokio::test]
    async fn default_start_ignores_supplied_end() {
        let svc = service(found(), Arc::new(FakeWeather::default()));

        let report = svc
            .fetch_historical("London", None, Some("2023-06-30"))
            .await
            .unwrap();

        assert_eq!(report.date_range.end, "2023-06-30");
        assert_eq!(report.date_range.start, "2024-02-14");
    }

    #[tokio::test]
    async fn empty_dates_count_as_missing() {
        let svc = service(found(), Arc::new(FakeWeather::default()));

        let report = svc.fetch_historical("London", Some(""), Some("")).await.unwrap();

        assert_eq!(
            report.date_range,
            DateRange { start: "2024-02-14".into(), end: "2024-03-14".into() }
        );
    }

    #[tokio::test]
    async fn inverted_range_is_passed_through() {
        let weather = Arc::new(FakeWeather {
            fail: true,
            ..Default::default()
        });
        let svc = service(found(), weather.clone());

        let err = svc
            .fetch_historical("London", Some("2024-02-01"), Some("2024-01-01"))
            .await
            .unwrap_err();

        assert_eq!(
            *weather.last_range.lock().unwrap(),
            Some(("2024-02-01".to_string(), "2024-01-01".to_string()))
        );
        assert_eq!(
            err.to_string(),
            "Historical weather API error: Parameter 'start_date' is invalid"
        );
    }

    #[tokio::test]
    async fn upstream_failures_wrap_by_operation() {
        let svc = service(
            found(),
            Arc::new(FakeWeather {
                fail: true,
                ..Default::default()
            }),
        );
        let err = svc.fetch_current("London").await.unwrap_err();
        assert_eq!(err, WeatherError::WeatherFetch("status 502".into()));

        let broken = Arc::new(FakeGeocoder {
            fail: true,
            ..Default::default()
        });
        let svc = service(broken, Arc::new(FakeWeather::default()));
        let resp = svc.get_weather_data("London", Some("historical"), None, None).await;
        let QueryResponse::Failure(env) = resp else {
            panic!("expected error envelope");
        };
        assert_eq!(env.error, "Geocoding error: geocoder unavailable");
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let svc = service(found(), Arc::new(FakeWeather::default()));

        let a = svc.get_weather_data_json("London", Some("current"), None, None).await;
        let b = svc.get_weather_data_json("London", Some("current"), None, None).await;

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn json_output_always_parses() {
        let svc = service(Arc::new(FakeGeocoder::default()), Arc::new(FakeWeather::default()));

        for (city, qt, start, end) in [
            ("", Some(""), None, None),
            ("London", Some("historical"), Some("not-a-date"), Some("31/12/2024")),
            ("\"quoted\"\n", None, None, None),
        ] {
            let out = svc.get_weather_data_json(city, qt, start, end).await;
            let parsed: QueryResponse = serde_json::from_str(&out).unwrap();
            assert!(parsed.is_error());
        }
    }

    #[test]
    fn default_range_handles_month_and_year_boundaries() {
        let jan_first = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();

        let range = default_date_range(jan_first, None, None);
        assert_eq!(range.end, "2024-12-31");
        assert_eq!(range.start, "2024-12-02");
    }
}
