//! Favorite places and their persistence.
//!
//! The whole set is written on every mutation; there is no delta log and no
//! schema version. Stores persist a plain JSON array of places.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::place::Place;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("favorites storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("favorites data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Insertion-ordered favorites, unique by [`Place::id`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Place>", into = "Vec<Place>")]
pub struct FavoritesSet {
    places: Vec<Place>,
}

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a snapshot of `place`. Returns false, leaving the existing entry
    /// untouched, when the id is already present.
    pub fn insert(&mut self, place: Place) -> bool {
        if self.contains(&place.id) {
            return false;
        }
        self.places.push(place);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<Place> {
        let index = self.places.iter().position(|place| place.id == id)?;
        Some(self.places.remove(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.places.iter().any(|place| place.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|place| place.id == id)
    }

    pub fn clear(&mut self) {
        self.places.clear();
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.places.iter()
    }
}

impl From<Vec<Place>> for FavoritesSet {
    /// Later duplicates are dropped so data written by older builds loads
    /// into a valid set.
    fn from(places: Vec<Place>) -> Self {
        let mut set = Self::new();
        for place in places {
            set.insert(place);
        }
        set
    }
}

impl From<FavoritesSet> for Vec<Place> {
    fn from(set: FavoritesSet) -> Self {
        set.places
    }
}

/// Persists the favorites set across restarts.
pub trait FavoritesStore {
    /// Returns an empty set when nothing has been saved yet.
    fn load(&self) -> Result<FavoritesSet, StoreError>;

    fn save(&self, favorites: &FavoritesSet) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Stores favorites as a JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesStore for JsonFileStore {
    fn load(&self) -> Result<FavoritesSet, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FavoritesSet::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, favorites: &FavoritesSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(&mut writer, favorites)?;
        writer.flush()?;
        drop(writer);
        fs::rename(tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), count = favorites.len(), "saved favorites");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keeps the serialized set in memory. Useful for tests and for hosts that
/// own persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw JSON last written, if any.
    pub fn raw(&self) -> Option<String> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl FavoritesStore for MemoryStore {
    fn load(&self) -> Result<FavoritesSet, StoreError> {
        match self.raw() {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(FavoritesSet::new()),
        }
    }

    fn save(&self, favorites: &FavoritesSet) -> Result<(), StoreError> {
        let raw = serde_json::to_string(favorites)?;
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;

    fn place(id: &str) -> Place {
        Place::new(id, format!("Place {}", id), Coordinate::new(40.0, -3.7).unwrap())
    }

    #[test]
    fn test_insert_dedupes_by_id() {
        let mut set = FavoritesSet::new();
        assert!(set.insert(place("a")));
        assert!(!set.insert(place("a").with_metadata("rating", 5.0)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().rating(), None);
    }

    #[test]
    fn test_insertion_order() {
        let mut set = FavoritesSet::new();
        for id in ["c", "a", "b"] {
            set.insert(place(id));
        }
        let ids: Vec<_> = set.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut set = FavoritesSet::from(vec![place("a"), place("b")]);
        assert_eq!(set.remove("a").map(|p| p.id), Some("a".to_string()));
        assert_eq!(set.remove("a"), None);
        assert!(!set.contains("a"));
        assert!(set.contains("b"));
    }

    #[test]
    fn test_from_vec_drops_duplicates() {
        let set = FavoritesSet::from(vec![place("a"), place("b"), place("a")]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serializes_as_array() {
        let set = FavoritesSet::from(vec![place("a")]);
        let json = serde_json::to_value(&set).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], "a");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());

        let set = FavoritesSet::from(vec![place("a"), place("b")]);
        store.save(&set).unwrap();
        assert_eq!(store.load().unwrap(), set);

        store.clear().unwrap();
        assert!(store.raw().is_none());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("favorites.json"));

        assert!(store.load().unwrap().is_empty());

        let set = FavoritesSet::from(vec![place("a"), place("b")]);
        store.save(&set).unwrap();
        assert_eq!(store.load().unwrap(), set);

        let mut smaller = set.clone();
        smaller.remove("a");
        store.save(&smaller).unwrap();
        assert_eq!(store.load().unwrap(), smaller);

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_loads_legacy_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        let raw = serde_json::to_string(&vec![place("a"), place("a")]).unwrap();
        fs::write(&path, raw).unwrap();

        let set = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
