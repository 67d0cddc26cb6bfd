//! HTTP client core
//!
//! Request/response types, error handling and the reqwest-backed client
//! shared by every remote service client in this crate. Services differ only
//! in their base URL, default headers and payload shapes.

use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// Error Types
// =============================================================================

/// HTTP error with status and message
///
/// Status `0` is used for failures that never produced an HTTP status, such
/// as connection errors and timeouts. A body that cannot be decoded keeps the
/// response's real status with the `ParseError` code.
///
/// # Examples
/// ```
/// use nav_client::http::HttpError;
///
/// let error = HttpError::new(404, "NotFound", "No such table");
/// assert_eq!(error.status(), 404);
/// assert!(!error.is_network_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: u16,
    error: String,
    message: String,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the error code
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a transport-level or transient server error
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.status,
            0 | 408 | 425 | 429 | 500 | 502 | 503 | 504 | 522 | 524
        ) && self.error != "ParseError"
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP error {}: {} - {}", self.status, self.error, self.message)
    }
}

impl std::error::Error for HttpError {}

/// Error body shapes returned by the services we talk to
///
/// GoTrue answers with `error`/`error_description` or `code`/`msg`,
/// PostgREST with `code`/`message`, OSRM with `code`/`message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    /// Short error code
    #[serde(default, alias = "code")]
    pub error: Option<serde_json::Value>,
    /// Long error message
    #[serde(default, alias = "error_description", alias = "msg")]
    pub message: Option<String>,
}

impl ServiceErrorBody {
    fn into_error(self, status: u16, raw: &str) -> HttpError {
        let code = match self.error {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => "Unknown".to_string(),
        };
        let message = self
            .message
            .unwrap_or_else(|| format!("HTTP {}: {}", status, raw));
        HttpError::new(status, code, message)
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A request relative to the client's base URL
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path below the base URL
    pub path: String,
    /// Query parameters, sent in insertion order
    pub params: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Content type of the body
    pub encoding: Option<String>,
}

impl HttpRequest {
    /// Create a new GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            params: Vec::new(),
            headers: HashMap::new(),
            body: None,
            encoding: None,
        }
    }

    /// Create a new POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            params: Vec::new(),
            headers: HashMap::new(),
            body: None,
            encoding: None,
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a bearer token
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Set the request body from JSON
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.encoding = Some("application/json".to_string());
        Ok(self)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response with headers and decoded data
#[derive(Debug, Clone)]
pub struct HttpResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response data
    pub data: T,
}

impl<T> HttpResponse<T> {
    /// Create a new response
    pub fn new(status: u16, headers: HashMap<String, String>, data: T) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for an HTTP client bound to one service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base service URL (e.g., "https://nominatim.openstreetmap.org")
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Headers included in all requests
    pub default_headers: HashMap<String, String>,
}

impl ClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Drive-OS/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Client Implementation
// =============================================================================

/// HTTP client for one remote service
///
/// # Examples
/// ```no_run
/// use nav_client::http::{ClientConfig, HttpClient, HttpRequest};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = HttpClient::new(ClientConfig::new("https://nominatim.openstreetmap.org"))?;
///
///     let request = HttpRequest::get("search").param("format", "json").param("q", "Berlin");
///     let response = client.send::<serde_json::Value>(request).await?;
///     println!("{}", response.data);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpError::new(0, "ClientError", format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Send a request and decode the JSON body
    pub async fn send<T>(&self, request: HttpRequest) -> Result<HttpResponse<T>, HttpError>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(request).await?;
        let (status, headers, body) = self.read_response(response).await?;

        let data: T = serde_json::from_str(&body).map_err(|e| {
            HttpError::new(status, "ParseError", format!("Failed to parse JSON: {}", e))
        })?;

        Ok(HttpResponse::new(status, headers, data))
    }

    /// Send a request whose successful response carries no useful body
    pub async fn send_empty(&self, request: HttpRequest) -> Result<HttpResponse<()>, HttpError> {
        let response = self.execute(request).await?;
        let (status, headers, _body) = self.read_response(response).await?;
        Ok(HttpResponse::new(status, headers, ()))
    }

    /// Full URL for a path below the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute(&self, request: HttpRequest) -> Result<ReqwestResponse, HttpError> {
        let url = self.url(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            if let Some(encoding) = &request.encoding {
                req = req.header("Content-Type", encoding);
            }
            req = req.body(body);
        }

        tracing::debug!(method = request.method.as_str(), %url, "sending request");

        req.send()
            .await
            .map_err(|e| HttpError::new(0, "NetworkError", format!("Request failed: {}", e)))
    }

    async fn read_response(
        &self,
        response: ReqwestResponse,
    ) -> Result<(u16, HashMap<String, String>, String), HttpError> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();

            return Err(match serde_json::from_str::<ServiceErrorBody>(&error_body) {
                Ok(parsed) => parsed.into_error(status, &error_body),
                Err(_) => HttpError::new(status, "Unknown", format!("HTTP {}: {}", status, error_body)),
            });
        }

        let body = response.text().await.map_err(|e| {
            HttpError::new(0, "NetworkError", format!("Failed to read response: {}", e))
        })?;

        Ok((status, headers, body))
    }
}

// =============================================================================
// Tests
// =============================================================================
