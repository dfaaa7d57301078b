//! Starting-point resolution for the map.
//!
//! With `map.auto_locate` enabled the map opens on the user's approximate
//! position from IP geolocation instead of the configured default.

use crate::config::MapConfig;
use ipgeolocate::{Locator, Service};
use tracing::{error, info};

/// Resolves the user's approximate location via IP geolocation.
///
/// On any failure the configured default coordinates are returned so the
/// map still has a center.
///
/// # Returns
///
/// A tuple `(latitude, longitude)` in decimal degrees (WGS84).
pub async fn get_current_location(fallback: &MapConfig) -> (f64, f64) {
    // An empty address makes ip-api answer for the caller's own IP.
    match Locator::get("", Service::IpApi).await {
        Ok(loc) => {
            let lat = loc.latitude.parse::<f64>().unwrap_or(fallback.default_lat);
            let lon = loc.longitude.parse::<f64>().unwrap_or(fallback.default_lon);
            info!("Geolocation successful - ({}, {})", lat, lon);
            (lat, lon)
        }
        Err(e) => {
            error!(
                "Error using geolocation service: {}. Using {} as default area.",
                e, fallback.default_name
            );
            (fallback.default_lat, fallback.default_lon)
        }
    }
}
