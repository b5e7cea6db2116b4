//! Encoded polyline codec and the decoded route geometry.
//!
//! Google's format (also emitted by OSRM with `geometries=polyline`): each
//! point is a latitude delta followed by a longitude delta, both scaled by
//! 1e5, zigzag-mapped and written as 5-bit groups offset by 63 with 0x20
//! as the continuation bit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::Coordinate;
use crate::haversine;

const PRECISION: f64 = 1e5;
const CHAR_OFFSET: u8 = 63;
const CONTINUATION: u64 = 0x20;
const GROUP_MASK: u64 = 0x1f;
/// 32-bit values fit in 7 groups; the 7th starts at shift 30.
const MAX_SHIFT: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("polyline ends mid-value at byte {offset}")]
    Truncated { offset: usize },
    #[error("invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidCharacter { offset: usize, byte: u8 },
    #[error("polyline value starting at byte {offset} exceeds 32 bits")]
    Overflow { offset: usize },
    #[error("polyline point {index} is outside valid coordinate range")]
    OutOfRange { index: usize },
}

/// A route geometry as decoded coordinates, origin first.
///
/// Fully materialized since callers need random access for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<Coordinate>,
}

impl Route {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn destination(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// Sum of great-circle segment lengths in meters.
    pub fn length_meters(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine::distance(pair[0], pair[1]))
            .sum()
    }
}

/// Decode an encoded polyline (precision 1e5) into a route.
///
/// Points depend on every delta before them, so decoding is strictly
/// sequential from the start of the string.
pub fn decode(encoded: &str) -> Result<Route, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut cursor = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while cursor < bytes.len() {
        lat += next_value(bytes, &mut cursor)?;
        if cursor == bytes.len() {
            return Err(PolylineError::Truncated { offset: cursor });
        }
        lng += next_value(bytes, &mut cursor)?;

        let point = Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION)
            .map_err(|_| PolylineError::OutOfRange {
                index: points.len(),
            })?;
        points.push(point);
    }

    Ok(Route::new(points))
}

/// Encode coordinates as a polyline. Values are rounded to 1e-5 degrees.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.latitude() * PRECISION).round() as i64;
        let lng = (point.longitude() * PRECISION).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn next_value(bytes: &[u8], cursor: &mut usize) -> Result<i64, PolylineError> {
    let start = *cursor;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*cursor) else {
            return Err(PolylineError::Truncated { offset: *cursor });
        };
        if !(CHAR_OFFSET..=b'~').contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                offset: *cursor,
                byte,
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: start });
        }
        *cursor += 1;

        let group = u64::from(byte - CHAR_OFFSET);
        result |= (group & GROUP_MASK) << shift;
        shift += 5;

        if group < CONTINUATION {
            break;
        }
    }

    let value = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !value } else { value })
}

fn push_value(out: &mut String, value: i64) {
    let mut v = ((value << 1) ^ (value >> 63)) as u64;
    while v >= CONTINUATION {
        out.push(char::from(((CONTINUATION | (v & GROUP_MASK)) as u8) + CHAR_OFFSET));
        v >>= 5;
    }
    out.push(char::from(v as u8 + CHAR_OFFSET));
}
