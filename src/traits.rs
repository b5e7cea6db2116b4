//! Capability traits for the external collaborators.
//!
//! The controller in [`crate::app`] only talks to these; concrete HTTP
//! adapters live in `google`, `wikipedia` and `osrm`.

use thiserror::Error;

use crate::coordinate::Coordinate;
use crate::place::Place;
use crate::polyline::{self, PolylineError, Route};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {message}")]
    Api { status: String, message: String },
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("route geometry could not be decoded: {0}")]
    Polyline(#[from] PolylineError),
}

impl ProviderError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        ProviderError::Parse(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("permission to access location was denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Device position source.
pub trait LocationProvider {
    fn current_location(&self) -> Result<Coordinate, LocationError>;
}

/// Searches for places around a point.
pub trait PlacesProvider {
    /// Places within `radius_m` meters of `origin`. Order is provider-defined.
    fn nearby(&self, origin: Coordinate, radius_m: f64) -> Result<Vec<Place>, ProviderError>;
}

/// Walking directions between two points, as an encoded polyline.
pub trait DirectionsProvider {
    fn encoded_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, ProviderError>;

    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route, ProviderError> {
        let encoded = self.encoded_route(origin, destination)?;
        Ok(polyline::decode(&encoded)?)
    }
}

impl<T: LocationProvider + ?Sized> LocationProvider for Box<T> {
    fn current_location(&self) -> Result<Coordinate, LocationError> {
        (**self).current_location()
    }
}

impl<T: PlacesProvider + ?Sized> PlacesProvider for Box<T> {
    fn nearby(&self, origin: Coordinate, radius_m: f64) -> Result<Vec<Place>, ProviderError> {
        (**self).nearby(origin, radius_m)
    }
}

impl<T: DirectionsProvider + ?Sized> DirectionsProvider for Box<T> {
    fn encoded_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, ProviderError> {
        (**self).encoded_route(origin, destination)
    }
}

/// A location source that always reports the same position, or none.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLocation(Option<Coordinate>);

impl FixedLocation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self(Some(coordinate))
    }

    /// Behaves like a device where the user refused location access.
    pub fn denied() -> Self {
        Self(None)
    }
}

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Result<Coordinate, LocationError> {
        self.0.ok_or(LocationError::PermissionDenied)
    }
}
