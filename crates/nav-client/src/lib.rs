//! Remote service clients for Drive OS
//!
//! This crate provides the HTTP client core and the clients for the external
//! services the map screen talks to: place lookup (Nominatim), routing (OSRM),
//! the remote location log and email/password authentication (Supabase).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod geocode;
pub mod http;
pub mod location_log;
pub mod routing;
pub mod types;

pub use auth::{AuthApi, AuthSession, AuthUser, GoTrueClient, SignUpOutcome};
pub use geocode::{NominatimClient, Place, PlaceLookup};
pub use http::{ClientConfig, HttpClient, HttpError, HttpRequest};
pub use location_log::{LocationLog, SupabaseLocationLog};
pub use routing::{OsrmClient, RouteGeometry, RouteService};
pub use types::{Coordinate, Identity, Viewport};

/// Result type for remote service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for remote service operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or HTTP status error
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A coordinate returned by a service could not be parsed
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
