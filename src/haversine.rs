//! Haversine great-circle distance.
//!
//! Spherical Earth model: good to roughly 0.5% against the ellipsoid, which
//! is plenty for "what is within walking distance" filtering.

use rayon::prelude::*;

use crate::coordinate::Coordinate;
use crate::place::Place;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude().to_radians();
    let lat2_rad = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Places within `radius_m` of `origin`, in their original order.
pub fn within_radius(origin: Coordinate, places: Vec<Place>, radius_m: f64) -> Vec<Place> {
    places
        .into_par_iter()
        .filter(|place| distance(origin, place.coordinate) <= radius_m)
        .collect()
}

/// Stable sort, nearest first.
pub fn sort_by_distance(origin: Coordinate, places: &mut [Place]) {
    places.sort_by(|a, b| {
        distance(origin, a.coordinate).total_cmp(&distance(origin, b.coordinate))
    });
}
