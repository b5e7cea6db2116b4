//! nearby-places core
//!
//! Great-circle distance, encoded polyline decoding and favorites storage
//! for a "historic places near me" app, plus the provider adapters and the
//! state controller that tie them together.

pub mod coordinate;
pub mod haversine;
pub mod polyline;
pub mod place;
pub mod favorites;
pub mod traits;
pub mod google;
pub mod wikipedia;
pub mod osrm;
pub mod config;
pub mod app;

pub use coordinate::{Coordinate, CoordinateError};
pub use place::Place;
pub use polyline::{PolylineError, Route};
