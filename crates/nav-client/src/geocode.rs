//! Free-text place lookup
//!
//! Resolves a search query to candidate places using the Nominatim search API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{ClientConfig, HttpClient, HttpRequest};
use crate::types::Coordinate;
use crate::{Error, Result};

/// Public Nominatim instance
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// A resolved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Location of the place
    pub coordinate: Coordinate,
    /// Human-readable name, when the service provides one
    pub display_name: Option<String>,
}

/// Looks up the best match for a free-text query
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Return the first candidate for `query`, or `None` when nothing matched
    async fn lookup(&self, query: &str) -> Result<Option<Place>>;
}

/// One entry of a Nominatim search response
///
/// Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimPlace {
    /// Latitude as a decimal string
    pub lat: String,
    /// Longitude as a decimal string
    pub lon: String,
    /// Full display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl NominatimPlace {
    /// Parse the string coordinates
    pub fn coordinate(&self) -> Result<Coordinate> {
        let parse = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    Error::InvalidCoordinate(format!("{} {:?} is not a number", axis, value))
                })
        };

        Ok(Coordinate::new(
            parse(&self.lat, "latitude")?,
            parse(&self.lon, "longitude")?,
        ))
    }
}

impl TryFrom<NominatimPlace> for Place {
    type Error = Error;

    fn try_from(entry: NominatimPlace) -> Result<Self> {
        Ok(Place {
            coordinate: entry.coordinate()?,
            display_name: entry.display_name,
        })
    }
}

/// Nominatim search client
///
/// # Example
///
/// ```no_run
/// # use nav_client::geocode::{NominatimClient, PlaceLookup, DEFAULT_NOMINATIM_URL};
/// # use nav_client::http::ClientConfig;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NominatimClient::new(ClientConfig::new(DEFAULT_NOMINATIM_URL))?;
/// if let Some(place) = client.lookup("Berlin").await? {
///     println!("Berlin is at {}", place.coordinate);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: HttpClient,
}

impl NominatimClient {
    /// Create a new Nominatim client
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }

    /// Run a search and return all candidates in service order
    pub async fn search(&self, query: &str) -> Result<Vec<NominatimPlace>> {
        let request = HttpRequest::get("search")
            .param("format", "json")
            .param("q", query);

        let response = self.client.send::<Vec<NominatimPlace>>(request).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl PlaceLookup for NominatimClient {
    async fn lookup(&self, query: &str) -> Result<Option<Place>> {
        let candidates = self.search(query).await?;
        tracing::debug!(query, candidates = candidates.len(), "place lookup finished");

        candidates.into_iter().next().map(Place::try_from).transpose()
    }
}
