//! Coordinate resolution for city names.

use tracing::debug;

use crate::{error::WeatherError, model::LocationResult, provider::Geocoder};

/// Resolve `city_name` to the geocoder's best match.
///
/// `Ok(None)` means the geocoder found nothing, which is not an error here;
/// callers decide whether it becomes one. Only the first match is used.
pub async fn resolve_location(
    geocoder: &dyn Geocoder,
    city_name: &str,
) -> Result<Option<LocationResult>, WeatherError> {
    debug!("Geocoding city name: {}", city_name);

    let matches = geocoder
        .search(city_name)
        .await
        .map_err(|e| WeatherError::geocoding(&e))?;

    let Some(best) = matches.into_iter().next() else {
        debug!("No geocoding results for: {}", city_name);
        return Ok(None);
    };

    debug!(
        "Found location: {} ({:.4}, {:.4})",
        best.name, best.latitude, best.longitude
    );

    Ok(Some(LocationResult {
        latitude: best.latitude,
        longitude: best.longitude,
        name: best.name,
        country: best.country.unwrap_or_default(),
        region: best.admin1.unwrap_or_default(),
    }))
}
