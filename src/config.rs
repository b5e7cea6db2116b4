//! Application configuration and provider selection.
//!
//! The original app shipped one copy per places backend; here the backend is
//! a configuration value.

use std::path::PathBuf;

use thiserror::Error;

use crate::favorites::JsonFileStore;
use crate::google::{GoogleConfig, GoogleDirectionsClient, GooglePlacesClient, GoogleSearch};
use crate::osrm::{OsrmClient, OsrmConfig};
use crate::traits::{DirectionsProvider, PlacesProvider};
use crate::wikipedia::{WikipediaClient, WikipediaConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a Google API key is required for {0}")]
    MissingApiKey(&'static str),
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacesSource {
    GoogleKeyword { keyword: String },
    GoogleRatedAttractions { min_rating: f64 },
    Wikipedia { limit: u32 },
}

impl Default for PlacesSource {
    fn default() -> Self {
        PlacesSource::GoogleKeyword {
            keyword: "historic".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsSource {
    Google,
    Osrm { base_url: String, profile: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub places: PlacesSource,
    pub directions: DirectionsSource,
    /// Search radius in meters.
    pub radius_m: f64,
    pub google_api_key: Option<String>,
    pub google_base_url: String,
    pub wikipedia_base_url: String,
    pub favorites_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            places: PlacesSource::default(),
            directions: DirectionsSource::Google,
            radius_m: 5000.0,
            google_api_key: None,
            google_base_url: "https://maps.googleapis.com".to_string(),
            wikipedia_base_url: "https://en.wikipedia.org".to_string(),
            favorites_path: PathBuf::from("favorites.json"),
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Reads the process environment. See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from a variable lookup, starting from defaults.
    ///
    /// Recognized: `GOOGLE_API_KEY`, `PLACES_PROVIDER` (`google-keyword`,
    /// `google-rated`, `wikipedia`), `PLACES_KEYWORD`, `PLACES_MIN_RATING`,
    /// `PLACES_RADIUS_M`, `FAVORITES_PATH`, `OSRM_BASE_URL`, `OSRM_PROFILE`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.google_api_key = lookup("GOOGLE_API_KEY").filter(|key| !key.is_empty());

        if let Some(value) = lookup("PLACES_PROVIDER") {
            config.places = match value.as_str() {
                "google-keyword" => PlacesSource::GoogleKeyword {
                    keyword: lookup("PLACES_KEYWORD").unwrap_or_else(|| "historic".to_string()),
                },
                "google-rated" => PlacesSource::GoogleRatedAttractions {
                    min_rating: parse_var(&lookup, "PLACES_MIN_RATING")?.unwrap_or(4.0),
                },
                "wikipedia" => PlacesSource::Wikipedia { limit: 50 },
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "PLACES_PROVIDER",
                        value: value.clone(),
                    });
                }
            };
        } else if let Some(keyword) = lookup("PLACES_KEYWORD") {
            config.places = PlacesSource::GoogleKeyword { keyword };
        }

        if let Some(radius) = parse_var::<f64>(&lookup, "PLACES_RADIUS_M")? {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigError::InvalidValue {
                    var: "PLACES_RADIUS_M",
                    value: radius.to_string(),
                });
            }
            config.radius_m = radius;
        }

        if let Some(path) = lookup("FAVORITES_PATH") {
            config.favorites_path = PathBuf::from(path);
        }

        if let Some(base_url) = lookup("OSRM_BASE_URL") {
            config.directions = DirectionsSource::Osrm {
                base_url,
                profile: lookup("OSRM_PROFILE").unwrap_or_else(|| "foot".to_string()),
            };
        }

        Ok(config)
    }

    fn google_config(&self, purpose: &'static str) -> Result<GoogleConfig, ConfigError> {
        let api_key = self
            .google_api_key
            .clone()
            .ok_or(ConfigError::MissingApiKey(purpose))?;
        Ok(GoogleConfig {
            base_url: self.google_base_url.clone(),
            api_key,
            timeout_secs: self.timeout_secs,
        })
    }

    pub fn places_provider(&self) -> Result<Box<dyn PlacesProvider + Send + Sync>, ConfigError> {
        let provider: Box<dyn PlacesProvider + Send + Sync> = match &self.places {
            PlacesSource::GoogleKeyword { keyword } => Box::new(GooglePlacesClient::new(
                self.google_config("places search")?,
                GoogleSearch::Keyword {
                    keyword: keyword.clone(),
                },
            )?),
            PlacesSource::GoogleRatedAttractions { min_rating } => {
                Box::new(GooglePlacesClient::new(
                    self.google_config("places search")?,
                    GoogleSearch::RatedAttractions {
                        min_rating: *min_rating,
                    },
                )?)
            }
            PlacesSource::Wikipedia { limit } => Box::new(WikipediaClient::new(WikipediaConfig {
                base_url: self.wikipedia_base_url.clone(),
                limit: *limit,
                timeout_secs: self.timeout_secs,
            })?),
        };
        Ok(provider)
    }

    pub fn directions_provider(
        &self,
    ) -> Result<Box<dyn DirectionsProvider + Send + Sync>, ConfigError> {
        let provider: Box<dyn DirectionsProvider + Send + Sync> = match &self.directions {
            DirectionsSource::Google => {
                Box::new(GoogleDirectionsClient::new(self.google_config("directions")?)?)
            }
            DirectionsSource::Osrm { base_url, profile } => Box::new(OsrmClient::new(OsrmConfig {
                base_url: base_url.clone(),
                profile: profile.clone(),
                timeout_secs: self.timeout_secs,
            })?),
        };
        Ok(provider)
    }

    pub fn favorites_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.favorites_path)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::InvalidValue { var, value }),
        },
        None => Ok(None),
    }
}
