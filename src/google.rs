//! Google Maps Platform adapters: Places nearby search and Directions.

use serde::Deserialize;

use crate::coordinate::Coordinate;
use crate::haversine;
use crate::place::Place;
use crate::traits::{DirectionsProvider, PlacesProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl GoogleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: api_key.into(),
            timeout_secs: 10,
        }
    }
}

/// Which flavor of nearby search to run.
#[derive(Debug, Clone, PartialEq)]
pub enum GoogleSearch {
    /// `type=point_of_interest` filtered by a free-text keyword.
    Keyword { keyword: String },
    /// `type=tourist_attraction`, keeping rated results at or above
    /// `min_rating`, best rated first.
    RatedAttractions { min_rating: f64 },
}

impl Default for GoogleSearch {
    fn default() -> Self {
        GoogleSearch::Keyword {
            keyword: "historic".to_string(),
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
}

fn lat_lng_param(coord: Coordinate) -> String {
    format!("{:.6},{:.6}", coord.latitude(), coord.longitude())
}

#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    config: GoogleConfig,
    search: GoogleSearch,
    client: reqwest::blocking::Client,
}

impl GooglePlacesClient {
    pub fn new(config: GoogleConfig, search: GoogleSearch) -> Result<Self, reqwest::Error> {
        let client = http_client(config.timeout_secs)?;
        Ok(Self {
            config,
            search,
            client,
        })
    }
}

impl PlacesProvider for GooglePlacesClient {
    #[tracing::instrument(skip(self), fields(search = ?self.search))]
    fn nearby(&self, origin: Coordinate, radius_m: f64) -> Result<Vec<Place>, ProviderError> {
        let url = format!("{}/maps/api/place/nearbysearch/json", self.config.base_url);
        let mut query = vec![
            ("location", lat_lng_param(origin)),
            ("radius", format!("{}", radius_m.round() as u64)),
            ("key", self.config.api_key.clone()),
        ];
        match &self.search {
            GoogleSearch::Keyword { keyword } => {
                query.push(("type", "point_of_interest".to_string()));
                query.push(("keyword", keyword.clone()));
            }
            GoogleSearch::RatedAttractions { .. } => {
                query.push(("type", "tourist_attraction".to_string()));
            }
        }

        let body = self
            .client
            .get(url)
            .query(&query)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())?;

        let places = parse_nearby(&body, &self.search)?;
        let places = haversine::within_radius(origin, places, radius_m);
        tracing::debug!(count = places.len(), "google nearby search");
        Ok(places)
    }
}

#[derive(Debug, Clone)]
pub struct GoogleDirectionsClient {
    config: GoogleConfig,
    client: reqwest::blocking::Client,
}

impl GoogleDirectionsClient {
    pub fn new(config: GoogleConfig) -> Result<Self, reqwest::Error> {
        let client = http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }
}

impl DirectionsProvider for GoogleDirectionsClient {
    #[tracing::instrument(skip(self))]
    fn encoded_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/maps/api/directions/json", self.config.base_url);
        let body = self
            .client
            .get(url)
            .query(&[
                ("origin", lat_lng_param(origin)),
                ("destination", lat_lng_param(destination)),
                ("mode", "walking".to_string()),
                ("key", self.config.api_key.clone()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())?;

        parse_directions(&body)
    }
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: Option<String>,
    name: Option<String>,
    geometry: Option<Geometry>,
    vicinity: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn check_status(status: String, error_message: Option<String>) -> Result<(), ProviderError> {
    match status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(()),
        _ => Err(ProviderError::Api {
            status,
            message: error_message.unwrap_or_default(),
        }),
    }
}

/// Decode a Places nearby-search body into places, applying the rating
/// rules of [`GoogleSearch::RatedAttractions`].
pub fn parse_nearby(body: &str, search: &GoogleSearch) -> Result<Vec<Place>, ProviderError> {
    let response: NearbySearchResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::parse(format!("nearby search body: {}", err)))?;
    check_status(response.status, response.error_message)?;

    let mut places = response
        .results
        .into_iter()
        .enumerate()
        .map(|(index, result)| nearby_result_to_place(index, result))
        .collect::<Result<Vec<_>, _>>()?;

    if let GoogleSearch::RatedAttractions { min_rating } = search {
        places.retain(|place| place.rating().is_some_and(|rating| rating >= *min_rating));
        places.sort_by(|a, b| {
            let (a, b) = (a.rating().unwrap_or(0.0), b.rating().unwrap_or(0.0));
            b.total_cmp(&a)
        });
    }

    Ok(places)
}

fn nearby_result_to_place(index: usize, result: NearbyResult) -> Result<Place, ProviderError> {
    let missing = |field: &str| ProviderError::parse(format!("results[{}] has no {}", index, field));

    let id = result.place_id.ok_or_else(|| missing("place_id"))?;
    let name = result.name.ok_or_else(|| missing("name"))?;
    let location = result
        .geometry
        .and_then(|geometry| geometry.location)
        .ok_or_else(|| missing("geometry.location"))?;
    let coordinate = Coordinate::new(location.lat, location.lng)
        .map_err(|err| ProviderError::parse(format!("results[{}]: {}", index, err)))?;

    let mut place = Place::new(id, name, coordinate);
    if let Some(vicinity) = result.vicinity {
        place = place.with_metadata("vicinity", vicinity);
    }
    if let Some(rating) = result.rating {
        place = place.with_metadata("rating", rating);
    }
    if let Some(total) = result.user_ratings_total {
        place = place.with_metadata("user_ratings_total", total);
    }
    Ok(place)
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: Option<OverviewPolyline>,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

/// Extract the overview polyline of the first route.
pub fn parse_directions(body: &str) -> Result<String, ProviderError> {
    let response: DirectionsResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::parse(format!("directions body: {}", err)))?;
    if response.status != "OK" {
        return Err(ProviderError::Api {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }

    response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::parse("directions response has no routes"))?
        .overview_polyline
        .map(|overview| overview.points)
        .ok_or_else(|| ProviderError::parse("routes[0] has no overview_polyline"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEARBY_BODY: &str = r#"{
        "html_attributions": [],
        "results": [
            {
                "place_id": "ChIJ-colosseo",
                "name": "Colosseo",
                "geometry": { "location": { "lat": 41.8902, "lng": 12.4922 } },
                "vicinity": "Piazza del Colosseo, 1, Roma",
                "rating": 4.7,
                "user_ratings_total": 350000
            },
            {
                "place_id": "ChIJ-arco",
                "name": "Arco di Costantino",
                "geometry": { "location": { "lat": 41.8898, "lng": 12.4906 } },
                "vicinity": "Via di San Gregorio, Roma"
            },
            {
                "place_id": "ChIJ-foro",
                "name": "Foro Romano",
                "geometry": { "location": { "lat": 41.8925, "lng": 12.4853 } },
                "rating": 4.8
            },
            {
                "place_id": "ChIJ-bar",
                "name": "Bar",
                "geometry": { "location": { "lat": 41.8910, "lng": 12.4900 } },
                "rating": 3.9
            }
        ],
        "status": "OK"
    }"#;

    #[test]
    fn test_parse_keyword_search_keeps_all() {
        let places = parse_nearby(NEARBY_BODY, &GoogleSearch::default()).unwrap();
        let ids: Vec<_> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ChIJ-colosseo", "ChIJ-arco", "ChIJ-foro", "ChIJ-bar"]);
        assert_eq!(places[0].vicinity(), Some("Piazza del Colosseo, 1, Roma"));
        assert_eq!(places[0].metadata["user_ratings_total"], 350000);
        assert_eq!(places[1].rating(), None);
    }

    #[test]
    fn test_parse_rated_attractions_filters_and_sorts() {
        let search = GoogleSearch::RatedAttractions { min_rating: 4.0 };
        let places = parse_nearby(NEARBY_BODY, &search).unwrap();
        let ids: Vec<_> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ChIJ-foro", "ChIJ-colosseo"]);
    }

    #[test]
    fn test_parse_zero_results() {
        let body = r#"{ "results": [], "status": "ZERO_RESULTS" }"#;
        assert!(parse_nearby(body, &GoogleSearch::default()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_denied_status() {
        let body = r#"{ "results": [], "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }"#;
        match parse_nearby(body, &GoogleSearch::default()) {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_geometry_is_descriptive() {
        let body = r#"{ "results": [ { "place_id": "x", "name": "X" } ], "status": "OK" }"#;
        match parse_nearby(body, &GoogleSearch::default()) {
            Err(ProviderError::Parse(message)) => {
                assert!(message.contains("results[0]"));
                assert!(message.contains("geometry.location"));
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bad_coordinate() {
        let body = r#"{ "results": [ { "place_id": "x", "name": "X",
            "geometry": { "location": { "lat": 123.0, "lng": 0.0 } } } ], "status": "OK" }"#;
        assert!(matches!(
            parse_nearby(body, &GoogleSearch::default()),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_not_json() {
        assert!(matches!(
            parse_nearby("<html>", &GoogleSearch::default()),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_directions() {
        let body = r#"{
            "geocoded_waypoints": [],
            "routes": [ { "summary": "Via dei Fori Imperiali",
                          "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" } } ],
            "status": "OK"
        }"#;
        assert_eq!(parse_directions(body).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_parse_directions_no_route() {
        let body = r#"{ "routes": [], "status": "ZERO_RESULTS" }"#;
        assert!(matches!(
            parse_directions(body),
            Err(ProviderError::Api { .. })
        ));

        let body = r#"{ "routes": [], "status": "OK" }"#;
        assert!(matches!(parse_directions(body), Err(ProviderError::Parse(_))));
    }
}
