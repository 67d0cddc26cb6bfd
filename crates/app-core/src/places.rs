//! Place resolution
//!
//! Turns a free-text query into a single destination using the first
//! candidate of a remote lookup.

use nav_client::geocode::{Place, PlaceLookup};
use std::sync::Arc;

/// Errors that can occur while resolving a place
#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    /// Transport or parse failure in the lookup service
    #[error("Lookup failed: {0}")]
    Lookup(#[from] nav_client::Error),
}

/// Result type for place resolution
pub type Result<T> = std::result::Result<T, PlaceError>;

/// Outcome of resolving a query
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The query was blank; nothing was requested
    Skipped,
    /// The service returned no candidates
    NotFound,
    /// The first candidate
    Found(Place),
}

/// Resolves search queries to places
#[derive(Clone)]
pub struct PlaceResolver {
    lookup: Arc<dyn PlaceLookup>,
}

impl PlaceResolver {
    /// Create a resolver over a lookup service
    pub fn new(lookup: Arc<dyn PlaceLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve `query` to its best match
    ///
    /// Blank queries are skipped without contacting the service. Additional
    /// candidates beyond the first are ignored.
    pub async fn resolve(&self, query: &str) -> Result<Resolution> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Resolution::Skipped);
        }

        match self.lookup.lookup(query).await? {
            Some(place) => Ok(Resolution::Found(place)),
            None => Ok(Resolution::NotFound),
        }
    }
}
