//! Geographic value types shared across the workspace

use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees
///
/// Values are taken from upstream services as-is; no range validation is
/// performed.
///
/// # Examples
/// ```
/// use nav_client::types::Coordinate;
///
/// let berlin = Coordinate::new(52.52, 13.405);
/// assert_eq!(berlin.to_lon_lat(), "13.405,52.52");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Create a coordinate from a GeoJSON `[longitude, latitude]` pair
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            latitude: pair[1],
            longitude: pair[0],
        }
    }

    /// Format as `longitude,latitude`, the order routing services expect in paths
    pub fn to_lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Visible rectangular extent of the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Center of the visible area
    pub center: Coordinate,
    /// Height of the visible area in degrees of latitude
    pub latitude_span: f64,
    /// Width of the visible area in degrees of longitude
    pub longitude_span: f64,
}

impl Viewport {
    /// Span used when jumping to a search result
    pub const SEARCH_RESULT_SPAN: f64 = 0.05;

    /// Span used when centering on the user
    pub const USER_FOCUS_SPAN: f64 = 0.01;

    /// Create a viewport
    pub fn new(center: Coordinate, latitude_span: f64, longitude_span: f64) -> Self {
        Self {
            center,
            latitude_span,
            longitude_span,
        }
    }

    /// Square viewport centered on a coordinate
    pub fn around(center: Coordinate, span: f64) -> Self {
        Self::new(center, span, span)
    }
}

impl Default for Viewport {
    /// Whole of Germany
    fn default() -> Self {
        Self::around(Coordinate::new(51.1657, 10.4515), 5.0)
    }
}

/// An authenticated user as seen by services that act on their behalf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id assigned by the authentication service
    pub user_id: String,
    /// Bearer token for requests made as this user
    pub access_token: String,
}

impl Identity {
    /// Create a new identity
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }
}
