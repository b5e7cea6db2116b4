//! OSRM HTTP adapter for walking routes.

use serde::Deserialize;

use crate::coordinate::Coordinate;
use crate::traits::{DirectionsProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "foot".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        // OSRM wants lng,lat
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=polyline",
            self.config.base_url,
            self.config.profile,
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude(),
        )
    }
}

impl DirectionsProvider for OsrmClient {
    #[tracing::instrument(skip(self))]
    fn encoded_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, ProviderError> {
        // OSRM reports NoRoute and friends with a 400 and a JSON body, so the
        // body is parsed before looking at the HTTP status.
        let body = self
            .client
            .get(self.route_url(origin, destination))
            .send()
            .and_then(|resp| resp.text())?;

        parse_route(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: Option<String>,
}

/// Extract the precision-5 polyline geometry of the first route.
pub fn parse_route(body: &str) -> Result<String, ProviderError> {
    let response: OsrmRouteResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::parse(format!("osrm route body: {}", err)))?;
    if response.code != "Ok" {
        return Err(ProviderError::Api {
            status: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::parse("osrm response has no routes"))?
        .geometry
        .ok_or_else(|| ProviderError::parse("routes[0] has no polyline geometry"))
}
