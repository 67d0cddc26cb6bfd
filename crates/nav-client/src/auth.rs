//! Email/password authentication
//!
//! Client for the Supabase GoTrue auth API: password sign-in, sign-up and
//! sign-out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::{ClientConfig, HttpClient, HttpRequest};
use crate::types::Identity;
use crate::Result;

/// Authenticated user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User id
    pub id: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens and user returned by a successful sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Access token (JWT)
    pub access_token: String,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Signed-in user
    pub user: AuthUser,
}

impl AuthSession {
    /// Identity used for requests made as this user
    pub fn identity(&self) -> Identity {
        Identity::new(self.user.id.clone(), self.access_token.clone())
    }
}

/// Result of a sign-up request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled and the user is signed in right away
    SignedIn(AuthSession),
    /// The user must confirm their email before signing in
    ConfirmationRequired(AuthUser),
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Email/password authentication operations
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Sign in with email and password
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Register a new account
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

/// Supabase GoTrue client
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    client: HttpClient,
}

impl GoTrueClient {
    /// Create a client for the project at `config.base_url`
    pub fn new(config: ClientConfig, anon_key: &str) -> Result<Self> {
        let config = config.with_header("apikey", anon_key);
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl AuthApi for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = HttpRequest::post("auth/v1/token")
            .param("grant_type", "password")
            .json_body(&Credentials { email, password })?;

        let response = self.client.send::<AuthSession>(request).await?;
        tracing::info!(user_id = %response.data.user.id, "signed in");
        Ok(response.data)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let request =
            HttpRequest::post("auth/v1/signup").json_body(&Credentials { email, password })?;

        let response = self.client.send::<SignUpOutcome>(request).await?;
        Ok(response.data)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = HttpRequest::post("auth/v1/logout").bearer(access_token);
        self.client.send_empty(request).await?;
        Ok(())
    }
}
