//! Application state and the controller that owns it.
//!
//! Collaborator failures are logged and leave the affected state as it was
//! (or empty, for the place list). Every operation still hands the error
//! back so a front end can decide whether to show it.

use thiserror::Error;

use crate::coordinate::Coordinate;
use crate::favorites::{FavoritesSet, FavoritesStore, StoreError};
use crate::place::Place;
use crate::polyline::Route;
use crate::traits::{DirectionsProvider, LocationError, LocationProvider, PlacesProvider, ProviderError};

/// Zoom span used when recentering on the user.
pub const DEFAULT_SPAN: MapSpan = MapSpan {
    latitude_delta: 0.0922,
    longitude_delta: 0.0421,
};

/// Tighter zoom used when jumping to a listed place.
pub const CLOSE_SPAN: MapSpan = MapSpan {
    latitude_delta: 0.005,
    longitude_delta: 0.005,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Map,
    List,
    Details,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSpan {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Region the map should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFocus {
    pub center: Coordinate,
    pub span: MapSpan,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("current location is unknown")]
    NoLocation,
    #[error("no listed place with id {0:?}")]
    UnknownPlace(String),
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub view: View,
    pub location: Option<Coordinate>,
    pub places: Vec<Place>,
    pub favorites: FavoritesSet,
    pub route: Option<Route>,
    /// Place the map should jump to on the next switch to [`View::Map`].
    pub target: Option<Coordinate>,
    pub map_focus: Option<MapFocus>,
}

pub struct App<L, P, D, S> {
    state: AppState,
    radius_m: f64,
    location: L,
    places: P,
    directions: D,
    store: S,
}

impl<L, P, D, S> App<L, P, D, S>
where
    L: LocationProvider,
    P: PlacesProvider,
    D: DirectionsProvider,
    S: FavoritesStore,
{
    /// Builds the controller and loads saved favorites. A store that fails to
    /// load leaves the app with an empty favorites set.
    pub fn new(location: L, places: P, directions: D, store: S, radius_m: f64) -> Self {
        let favorites = store.load().unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to load favorites");
            FavoritesSet::new()
        });

        Self {
            state: AppState {
                favorites,
                ..AppState::default()
            },
            radius_m,
            location,
            places,
            directions,
            store,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Switches screens. Map and List need the device position; List also
    /// refreshes the place list once a position is known.
    pub fn set_view(&mut self, view: View) {
        self.state.view = view;

        if matches!(view, View::Map | View::List) {
            let _ = self.refresh_location();
        }
        if view == View::List && self.state.location.is_some() {
            let _ = self.refresh_places();
        }
        if view == View::Map {
            if let Some(target) = self.state.target.take() {
                self.state.map_focus = Some(MapFocus {
                    center: target,
                    span: CLOSE_SPAN,
                });
            } else if self.state.map_focus.is_none() {
                self.state.map_focus = self.state.location.map(|center| MapFocus {
                    center,
                    span: DEFAULT_SPAN,
                });
            }
        }
    }

    pub fn refresh_location(&mut self) -> Result<Coordinate, AppError> {
        match self.location.current_location() {
            Ok(coord) => {
                self.state.location = Some(coord);
                Ok(coord)
            }
            Err(err) => {
                tracing::error!(error = %err, "location lookup failed");
                Err(err.into())
            }
        }
    }

    /// Replaces the place list with a fresh search around the current
    /// location. On failure the list is emptied.
    pub fn refresh_places(&mut self) -> Result<usize, AppError> {
        let origin = self.state.location.ok_or(AppError::NoLocation)?;
        match self.places.nearby(origin, self.radius_m) {
            Ok(places) => {
                tracing::info!(count = places.len(), radius_m = self.radius_m, "places refreshed");
                self.state.places = places;
                Ok(self.state.places.len())
            }
            Err(err) => {
                tracing::error!(error = %err, "places search failed");
                self.state.places.clear();
                Err(err.into())
            }
        }
    }

    fn listed_place(&self, place_id: &str) -> Result<&Place, AppError> {
        self.state
            .places
            .iter()
            .find(|place| place.id == place_id)
            .ok_or_else(|| AppError::UnknownPlace(place_id.to_string()))
    }

    /// Saves a snapshot of a listed place. Returns false when it was already
    /// a favorite.
    pub fn save_favorite(&mut self, place_id: &str) -> Result<bool, AppError> {
        let place = self.listed_place(place_id)?.clone();
        let mut updated = self.state.favorites.clone();
        if !updated.insert(place) {
            return Ok(false);
        }
        self.commit_favorites(updated)?;
        Ok(true)
    }

    pub fn remove_favorite(&mut self, place_id: &str) -> Result<Option<Place>, AppError> {
        let mut updated = self.state.favorites.clone();
        let removed = updated.remove(place_id);
        if removed.is_some() {
            self.commit_favorites(updated)?;
        }
        Ok(removed)
    }

    pub fn clear_favorites(&mut self) -> Result<(), AppError> {
        if let Err(err) = self.store.clear() {
            tracing::error!(error = %err, "failed to clear favorites");
            return Err(err.into());
        }
        self.state.favorites.clear();
        Ok(())
    }

    fn commit_favorites(&mut self, updated: FavoritesSet) -> Result<(), AppError> {
        if let Err(err) = self.store.save(&updated) {
            tracing::error!(error = %err, "failed to save favorites");
            return Err(err.into());
        }
        self.state.favorites = updated;
        Ok(())
    }

    /// Jumps the map to a listed place.
    pub fn go_to(&mut self, place_id: &str) -> Result<(), AppError> {
        let target = self.listed_place(place_id)?.coordinate;
        self.state.target = Some(target);
        self.set_view(View::Map);
        Ok(())
    }

    /// Points the map back at the user.
    pub fn recenter(&mut self) -> Option<MapFocus> {
        let center = self.state.location?;
        let focus = MapFocus {
            center,
            span: DEFAULT_SPAN,
        };
        self.state.map_focus = Some(focus);
        Some(focus)
    }

    /// Fetches a walking route from the current location to a listed place
    /// and replaces any previous route.
    pub fn request_route(&mut self, place_id: &str) -> Result<&Route, AppError> {
        let origin = self.state.location.ok_or(AppError::NoLocation)?;
        let destination = self.listed_place(place_id)?.coordinate;

        self.state.route = None;
        match self.directions.route(origin, destination) {
            Ok(route) => {
                tracing::info!(points = route.len(), meters = route.length_meters(), "route loaded");
                Ok(self.state.route.insert(route))
            }
            Err(err) => {
                tracing::error!(error = %err, "route request failed");
                Err(err.into())
            }
        }
    }

    pub fn reset_route(&mut self) {
        self.state.route = None;
    }
}
