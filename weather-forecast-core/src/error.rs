use thiserror::Error;

/// Failures surfaced by the query orchestrator.
///
/// Only the message text reaches callers of the tool: every variant ends up
/// in the `error` field of an [`ErrorEnvelope`](crate::ErrorEnvelope).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("City '{0}' not found")]
    CityNotFound(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Weather API error: {0}")]
    WeatherFetch(String),

    #[error("Historical weather API error: {0}")]
    HistoricalFetch(String),

    #[error("Invalid query_type: {0}. Must be 'current' or 'historical'")]
    InvalidQueryType(String),
}

impl WeatherError {
    pub(crate) fn geocoding(err: &anyhow::Error) -> Self {
        Self::Geocoding(format!("{err:#}"))
    }

    pub(crate) fn weather_fetch(err: &anyhow::Error) -> Self {
        Self::WeatherFetch(format!("{err:#}"))
    }

    pub(crate) fn historical_fetch(err: &anyhow::Error) -> Self {
        Self::HistoricalFetch(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn city_not_found_embeds_city_name() {
        let err = WeatherError::CityNotFound("Nowhere123xyz".into());
        assert_eq!(err.to_string(), "City 'Nowhere123xyz' not found");
    }

    #[test]
    fn invalid_query_type_names_the_value() {
        let err = WeatherError::InvalidQueryType("forecast".into());
        assert_eq!(
            err.to_string(),
            "Invalid query_type: forecast. Must be 'current' or 'historical'"
        );
    }

    #[test]
    fn wrapped_errors_keep_the_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = inner.context("Failed to send request").unwrap_err();

        let wrapped = WeatherError::weather_fetch(&err);
        assert_eq!(
            wrapped.to_string(),
            "Weather API error: Failed to send request: connection refused"
        );
    }
}
