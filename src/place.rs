//! Point-of-interest records returned by the places providers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coordinate::Coordinate;

/// A place returned by a search. Treated as immutable once built; a
/// favorite is a clone of the listed place, not a link to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    /// Provider-specific extras (rating, vicinity, distance...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Numeric rating, when the provider supplied one.
    pub fn rating(&self) -> Option<f64> {
        self.metadata.get("rating").and_then(Value::as_f64)
    }

    /// Short address line ("vicinity" in Google's vocabulary).
    pub fn vicinity(&self) -> Option<&str> {
        self.metadata.get("vicinity").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coordinate {
        Coordinate::new(41.8902, 12.4922).unwrap()
    }

    #[test]
    fn test_metadata_accessors() {
        let place = Place::new("colosseum", "Colosseum", coord())
            .with_metadata("rating", 4.7)
            .with_metadata("vicinity", "Piazza del Colosseo");

        assert_eq!(place.rating(), Some(4.7));
        assert_eq!(place.vicinity(), Some("Piazza del Colosseo"));
    }

    #[test]
    fn test_missing_metadata() {
        let place = Place::new("x", "X", coord());
        assert_eq!(place.rating(), None);
        assert_eq!(place.vicinity(), None);
    }

    #[test]
    fn test_json_without_metadata() {
        let place = Place::new("x", "X", coord());
        let json = serde_json::to_string(&place).unwrap();
        assert!(!json.contains("metadata"));

        let back: Place = serde_json::from_str(&json).unwrap();
        assert_eq!(back, place);
    }
}
