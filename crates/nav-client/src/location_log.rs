//! Remote append-only location log
//!
//! Position fixes of signed-in users are inserted as rows into a Supabase
//! table through its PostgREST interface. There is no read path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{ClientConfig, HttpClient, HttpRequest};
use crate::types::{Coordinate, Identity};
use crate::Result;

/// Default table receiving location rows
pub const DEFAULT_LOCATION_TABLE: &str = "user_locations";

/// One row of the location log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Owner of the fix
    pub user_id: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl LocationEntry {
    /// Build a row for a user and a coordinate
    pub fn new(user_id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            user_id: user_id.into(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }
    }
}

/// Appends position fixes to remote storage
#[async_trait]
pub trait LocationLog: Send + Sync {
    /// Insert one fix on behalf of `identity`
    async fn append(&self, identity: &Identity, coordinate: Coordinate) -> Result<()>;
}

/// Location log backed by a Supabase table
#[derive(Debug, Clone)]
pub struct SupabaseLocationLog {
    client: HttpClient,
    table: String,
}

impl SupabaseLocationLog {
    /// Create a log writer for the project at `config.base_url`
    ///
    /// The anon key is sent as `apikey` on every request.
    pub fn new(config: ClientConfig, anon_key: &str) -> Result<Self> {
        let config = config.with_header("apikey", anon_key);
        Ok(Self {
            client: HttpClient::new(config)?,
            table: DEFAULT_LOCATION_TABLE.to_string(),
        })
    }

    /// Write to a different table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Table receiving rows
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl LocationLog for SupabaseLocationLog {
    async fn append(&self, identity: &Identity, coordinate: Coordinate) -> Result<()> {
        let entry = LocationEntry::new(identity.user_id.clone(), coordinate);

        let request = HttpRequest::post(format!("rest/v1/{}", self.table))
            .bearer(&identity.access_token)
            .header("Prefer", "return=minimal")
            .json_body(&entry)?;

        self.client.send_empty(request).await?;
        Ok(())
    }
}
