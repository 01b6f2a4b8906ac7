use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.008_771_4;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A message pinned to a point on the map.
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
pub struct Post {
    pub user: String,
    pub message: String,
    pub location: Location,
}

/// A WGS84 coordinate in degrees. Both components are range checked on construction.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Deserialize, Serialize)]
#[serde(try_from = "LocationParts")]
pub struct Location {
    lat: f64,
    lon: f64,
}

#[derive(Copy, Clone, PartialEq, Debug, Error)]
pub enum InvalidLocationError {
    #[error("Latitude {0} is outside of [-90, 90]")]
    Latitude(f64),
    #[error("Longitude {0} is outside of [-180, 180]")]
    Longitude(f64),
}

#[derive(Deserialize)]
struct LocationParts {
    lat: f64,
    lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidLocationError> {
        // RangeInclusive::contains is false for NaN, so non-finite values are rejected too.
        if !LATITUDE_RANGE.contains(&lat) {
            return Err(InvalidLocationError::Latitude(lat));
        }
        if !LONGITUDE_RANGE.contains(&lon) {
            return Err(InvalidLocationError::Longitude(lon));
        }

        Ok(Self { lat, lon })
    }

    #[must_use]
    pub fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lon(self) -> f64 {
        self.lon
    }

    /// Great-circle distance to `other` in kilometers (haversine).
    #[must_use]
    pub fn distance_to(self, other: Location) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_MEAN_RADIUS_KM * c
    }
}

impl TryFrom<LocationParts> for Location {
    type Error = InvalidLocationError;

    fn try_from(value: LocationParts) -> Result<Self, Self::Error> {
        Self::new(value.lat, value.lon)
    }
}
