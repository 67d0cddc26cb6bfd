//! Route geometry lookup
//!
//! Requests driving routes from an OSRM server with full GeoJSON geometry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{ClientConfig, HttpClient, HttpRequest};
use crate::types::Coordinate;
use crate::Result;

/// Public OSRM demo server
pub const DEFAULT_OSRM_URL: &str = "http://router.project-osrm.org";

const DRIVING_PROFILE: &str = "driving";

/// A route between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    /// Path points in travel order
    pub path: Vec<Coordinate>,
    /// Total distance in meters
    pub distance: Option<f64>,
    /// Expected travel time in seconds
    pub duration: Option<f64>,
}

/// Finds a route between two coordinates
#[async_trait]
pub trait RouteService: Send + Sync {
    /// Return the first candidate route, or `None` when the service found none
    async fn route(&self, start: Coordinate, end: Coordinate) -> Result<Option<RouteGeometry>>;
}

/// OSRM `route` service response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmResponse {
    /// Status code, "Ok" on success
    #[serde(default)]
    pub code: Option<String>,
    /// Candidate routes, best first
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

/// One OSRM route candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmRoute {
    /// GeoJSON line geometry
    pub geometry: LineString,
    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
}

/// GeoJSON LineString with `[longitude, latitude]` positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineString {
    /// Ordered positions
    pub coordinates: Vec<[f64; 2]>,
}

impl From<OsrmRoute> for RouteGeometry {
    fn from(route: OsrmRoute) -> Self {
        RouteGeometry {
            path: route
                .geometry
                .coordinates
                .into_iter()
                .map(Coordinate::from_lon_lat)
                .collect(),
            distance: route.distance,
            duration: route.duration,
        }
    }
}

/// OSRM routing client
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: HttpClient,
}

impl OsrmClient {
    /// Create a client using the driving profile
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }

    /// Service path for a start/end pair
    pub fn route_path(&self, start: Coordinate, end: Coordinate) -> String {
        format!(
            "route/v1/{}/{};{}",
            DRIVING_PROFILE,
            start.to_lon_lat(),
            end.to_lon_lat()
        )
    }

    /// Fetch the raw OSRM response
    pub async fn fetch(&self, start: Coordinate, end: Coordinate) -> Result<OsrmResponse> {
        let request = HttpRequest::get(self.route_path(start, end))
            .param("overview", "full")
            .param("geometries", "geojson");

        let response = self.client.send::<OsrmResponse>(request).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl RouteService for OsrmClient {
    async fn route(&self, start: Coordinate, end: Coordinate) -> Result<Option<RouteGeometry>> {
        let response = self.fetch(start, end).await?;
        Ok(response.routes.into_iter().next().map(RouteGeometry::from))
    }
}
