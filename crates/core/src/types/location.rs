//! Store geolocation.
//!
//! Locations are persisted in `GeoJSON` point form:
//!
//! ```json
//! { "type": "Point", "coordinates": [lng, lat], "address": "..." }
//! ```

use serde::{Deserialize, Serialize};

/// The only geometry type stores use.
pub const POINT_TYPE: &str = "Point";

/// Errors that can occur when building a [`Location`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    /// The address is empty after trimming.
    #[error("You must supply an address")]
    EmptyAddress,
    /// A coordinate is missing, not finite, or out of range.
    #[error("You must supply coordinates ({0})")]
    InvalidCoordinates(String),
}

/// A longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Longitude in degrees, `-180..=180`.
    pub lng: f64,
    /// Latitude in degrees, `-90..=90`.
    pub lat: f64,
}

impl Point {
    /// Create a point, checking both coordinates are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidCoordinates`] for NaN, infinite or
    /// out-of-range values.
    pub fn new(lng: f64, lat: f64) -> Result<Self, LocationError> {
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(LocationError::InvalidCoordinates(format!(
                "longitude {lng} out of range"
            )));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::InvalidCoordinates(format!(
                "latitude {lat} out of range"
            )));
        }
        Ok(Self { lng, lat })
    }

    /// Coordinates in `GeoJSON` order: `[lng, lat]`.
    #[must_use]
    pub const fn coordinates(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Where a store is: a point plus a required street address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LocationRepr", into = "LocationRepr")]
pub struct Location {
    /// Geographic position.
    pub point: Point,
    /// Human-readable address, trimmed and non-empty.
    pub address: String,
}

impl Location {
    /// Build a location, trimming the address.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::EmptyAddress`] if the address is blank.
    pub fn new(point: Point, address: &str) -> Result<Self, LocationError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(LocationError::EmptyAddress);
        }
        Ok(Self {
            point,
            address: address.to_owned(),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct LocationRepr {
    #[serde(rename = "type", default = "point_type")]
    kind: String,
    coordinates: Vec<f64>,
    address: String,
}

fn point_type() -> String {
    POINT_TYPE.to_owned()
}

impl TryFrom<LocationRepr> for Location {
    type Error = LocationError;

    fn try_from(repr: LocationRepr) -> Result<Self, Self::Error> {
        let &[lng, lat] = repr.coordinates.as_slice() else {
            return Err(LocationError::InvalidCoordinates(format!(
                "expected [lng, lat], got {} values",
                repr.coordinates.len()
            )));
        };
        Self::new(Point::new(lng, lat)?, &repr.address)
    }
}

impl From<Location> for LocationRepr {
    fn from(location: Location) -> Self {
        Self {
            kind: point_type(),
            coordinates: location.point.coordinates().to_vec(),
            address: location.address,
        }
    }
}
