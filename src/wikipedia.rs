//! Wikipedia geosearch adapter (MediaWiki `list=geosearch`).

use serde::Deserialize;

use crate::coordinate::Coordinate;
use crate::haversine;
use crate::place::Place;
use crate::traits::{PlacesProvider, ProviderError};

/// Bounds the API accepts for `gsradius`, in meters.
const MIN_RADIUS_M: f64 = 10.0;
const MAX_RADIUS_M: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    pub base_url: String,
    /// Maximum number of pages per request (`gslimit`, 1..=500).
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org".to_string(),
            limit: 50,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WikipediaClient {
    config: WikipediaConfig,
    client: reqwest::blocking::Client,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("nearby-places/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, client })
    }
}

impl PlacesProvider for WikipediaClient {
    #[tracing::instrument(skip(self))]
    fn nearby(&self, origin: Coordinate, radius_m: f64) -> Result<Vec<Place>, ProviderError> {
        let radius = radius_m.clamp(MIN_RADIUS_M, MAX_RADIUS_M);
        if radius != radius_m {
            tracing::debug!(requested = radius_m, used = radius, "clamped geosearch radius");
        }

        let url = format!("{}/w/api.php", self.config.base_url);
        let body = self
            .client
            .get(url)
            .query(&[
                ("action", "query".to_string()),
                ("list", "geosearch".to_string()),
                (
                    "gscoord",
                    format!("{:.6}|{:.6}", origin.latitude(), origin.longitude()),
                ),
                ("gsradius", format!("{}", radius.round() as u64)),
                ("gslimit", self.config.limit.clamp(1, 500).to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())?;

        let places = parse_geosearch(&body)?;
        Ok(haversine::within_radius(origin, places, radius_m))
    }
}

#[derive(Debug, Deserialize)]
struct GeosearchResponse {
    query: Option<GeosearchQuery>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct GeosearchQuery {
    geosearch: Vec<GeosearchPage>,
}

#[derive(Debug, Deserialize)]
struct GeosearchPage {
    pageid: Option<u64>,
    title: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    dist: Option<f64>,
}

/// Decode a geosearch body. Page ids become place ids; the reported
/// distance is kept as `dist` metadata.
pub fn parse_geosearch(body: &str) -> Result<Vec<Place>, ProviderError> {
    let response: GeosearchResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::parse(format!("geosearch body: {}", err)))?;

    if let Some(error) = response.error {
        return Err(ProviderError::Api {
            status: error.code,
            message: error.info,
        });
    }

    let query = response
        .query
        .ok_or_else(|| ProviderError::parse("geosearch response has no query"))?;

    query
        .geosearch
        .into_iter()
        .enumerate()
        .map(|(index, page)| {
            let missing =
                |field: &str| ProviderError::parse(format!("geosearch[{}] has no {}", index, field));
            let pageid = page.pageid.ok_or_else(|| missing("pageid"))?;
            let title = page.title.ok_or_else(|| missing("title"))?;
            let lat = page.lat.ok_or_else(|| missing("lat"))?;
            let lon = page.lon.ok_or_else(|| missing("lon"))?;
            let coordinate = Coordinate::new(lat, lon)
                .map_err(|err| ProviderError::parse(format!("geosearch[{}]: {}", index, err)))?;

            let mut place = Place::new(pageid.to_string(), title, coordinate);
            if let Some(dist) = page.dist {
                place = place.with_metadata("dist", dist);
            }
            Ok(place)
        })
        .collect()
}
