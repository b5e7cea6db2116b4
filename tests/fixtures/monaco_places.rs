//! Historic places in Monaco with OpenStreetMap coordinates.

use nearby_places::{Coordinate, Place};

/// A named landmark.
#[derive(Debug, Clone)]
pub struct Landmark {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Landmark {
    pub const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64) -> Self {
        Self { id, name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng).expect("fixture coordinate")
    }

    pub fn place(&self) -> Place {
        Place::new(self.id, self.name, self.coordinate())
    }
}

pub const LANDMARKS: &[Landmark] = &[
    Landmark::new("palais", "Palais Princier", 43.7314, 7.4197),
    Landmark::new("cathedrale", "Cathédrale de Monaco", 43.7302, 7.4229),
    Landmark::new("musee", "Musée océanographique", 43.7307, 7.4254),
    Landmark::new("fort", "Fort Antoine", 43.7319, 7.4270),
    Landmark::new("casino", "Casino de Monte-Carlo", 43.7393, 7.4277),
    Landmark::new("jardin", "Jardin Exotique", 43.7310, 7.4130),
];

/// Far enough from Monaco to fall outside any walking radius.
pub const NICE_PORT: Landmark = Landmark::new("nice-port", "Port Lympia", 43.6959, 7.2853);

/// Place du Casino, a convenient starting point.
pub fn start() -> Coordinate {
    Coordinate::new(43.7387, 7.4279).expect("fixture coordinate")
}

pub fn places() -> Vec<Place> {
    LANDMARKS.iter().map(Landmark::place).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmarks_in_monaco() {
        for landmark in LANDMARKS {
            assert!(landmark.lat > 43.72 && landmark.lat < 43.76, "{} lat", landmark.name);
            assert!(landmark.lng > 7.40 && landmark.lng < 7.44, "{} lng", landmark.name);
        }
    }
}
