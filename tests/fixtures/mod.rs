//! Test fixtures for nearby-places.
//!
//! Provides:
//! - Real Monaco landmarks (from OpenStreetMap), small enough for a quick
//!   OSRM extract
//! - OSRM dataset preparation for the docker-backed route test

#![allow(dead_code)]

pub mod monaco_places;
pub mod osrm_dataset;

pub use monaco_places::*;
