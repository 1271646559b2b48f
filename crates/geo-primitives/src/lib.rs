//! Geo Primitives
//!
//! WGS84 coordinates and the haversine great-circle distance shared by the
//! geofence evaluator and the dispatch planner.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

pub type Result<T> = std::result::Result<T, GeoError>;

/// A point on the Earth's surface in decimal degrees.
///
/// Struct literals are not range checked; use [`Coordinate::new`] at input
/// boundaries. Non-finite values propagate through [`distance_meters`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a validated coordinate (finite, lat in [-90, 90], lng in [-180, 180])
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if is_valid_latitude(latitude) && is_valid_longitude(longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(GeoError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_latitude(self.latitude) && is_valid_longitude(self.longitude)
    }

    /// Shift by a number of degrees on each axis
    pub fn offset(&self, dlat: f64, dlng: f64) -> Self {
        Self {
            latitude: self.latitude + dlat,
            longitude: self.longitude + dlng,
        }
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(*self, *other)
    }
}

/// Latitude is finite and within [-90, 90]
pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

/// Longitude is finite and within [-180, 180]
pub fn is_valid_longitude(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

fn to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Haversine distance between two coordinates in meters
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = to_radians(b.latitude - a.latitude);
    let dlng = to_radians(b.longitude - a.longitude);

    let h = (dlat / 2.0).sin().powi(2)
        + to_radians(a.latitude).cos()
            * to_radians(b.latitude).cos()
            * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
