use crate::geo::consts::{MAX_LATITUDE, MAX_LONGITUDE};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A validated WGS84 coordinate pair.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside of [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside of [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || lng.abs() > MAX_LONGITUDE {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Parses form input. Anything that isn't a number in range counts as unset.
    pub fn parse(raw_lat: &str, raw_lng: &str) -> Option<Self> {
        let lat = raw_lat.trim().parse::<f64>().ok()?;
        let lng = raw_lng.trim().parse::<f64>().ok()?;
        Self::new(lat, lng).ok()
    }

    /// Builds a point from a GeoJSON-ordered `[lng, lat]` pair.
    pub fn from_lng_lat(pair: [f64; 2]) -> Result<Self, GeoError> {
        Self::new(pair[1], pair[0])
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawGeoPoint {
            lat: f64,
            lng: f64,
        }

        let raw = RawGeoPoint::deserialize(deserializer)?;
        GeoPoint::new(raw.lat, raw.lng).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareEstimate {
    pub distance_km: f64,
    pub fee: u64,
}
