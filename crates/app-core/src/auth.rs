//! Authentication service for Drive OS
//!
//! Email/password sign-in, sign-up and sign-out on top of an [`AuthApi`]
//! backend. The signed-in user lands in the shared [`SessionStore`], which is
//! all the rest of the app looks at. Failures are surfaced to the user as
//! notices carrying the service's own message.

use app_state::notice::{Notice, NoticeCenter};
use app_state::session::{Session, SessionStore};
use nav_client::auth::{AuthApi, AuthSession, SignUpOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Authentication service error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password left empty
    #[error("Email and password are required")]
    MissingCredentials,

    /// The auth service rejected the request or could not be reached
    #[error("Auth service error: {0}")]
    Service(#[from] nav_client::Error),

    /// No active session
    #[error("No active session")]
    NoSession,
}

impl AuthError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Service(nav_client::Error::Http(e)) => e.message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Which action the auth form submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthMode {
    /// Existing account
    #[default]
    SignIn,
    /// New account
    SignUp,
}

impl AuthMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    /// Form heading
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Welcome Back",
            AuthMode::SignUp => "Create Account",
        }
    }

    /// Submit button label
    pub fn submit_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Login",
            AuthMode::SignUp => "Sign Up",
        }
    }

    /// Label of the link that switches modes
    pub fn switch_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Don't have an account? Sign Up",
            AuthMode::SignUp => "Already have an account? Login",
        }
    }
}

/// Contents of the auth form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthForm {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Submit action
    pub mode: AuthMode,
}

impl AuthForm {
    /// Create a sign-in form
    pub fn sign_in(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            mode: AuthMode::SignIn,
        }
    }

    /// Create a sign-up form
    pub fn sign_up(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::SignUp,
            ..Self::sign_in(email, password)
        }
    }

    /// Switch between sign-in and sign-up
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }
}

/// Successful result of submitting the auth form
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// The user is signed in
    SignedIn(Session),
    /// An account was created and awaits email confirmation
    ConfirmationSent,
}

/// High-level authentication service
#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: SessionStore,
    notices: NoticeCenter,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(api: Arc<dyn AuthApi>, session: SessionStore, notices: NoticeCenter) -> Self {
        Self {
            api,
            session,
            notices,
        }
    }

    /// Shared session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Submit the auth form in its current mode
    pub async fn submit(&self, form: &AuthForm) -> Result<AuthOutcome> {
        match form.mode {
            AuthMode::SignIn => self.sign_in(&form.email, &form.password).await,
            AuthMode::SignUp => self.sign_up(&form.email, &form.password).await,
        }
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let result = match credentials(email, password) {
            Ok((email, password)) => self
                .api
                .sign_in_with_password(email, password)
                .await
                .map_err(AuthError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(auth) => Ok(AuthOutcome::SignedIn(self.start_session(auth))),
            Err(e) => Err(self.report(e)),
        }
    }

    /// Create an account
    ///
    /// When the backend requires email confirmation no session is started
    /// and the user is told to check their inbox.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let result = match credentials(email, password) {
            Ok((email, password)) => self
                .api
                .sign_up(email, password)
                .await
                .map_err(AuthError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(SignUpOutcome::SignedIn(auth)) => Ok(AuthOutcome::SignedIn(self.start_session(auth))),
            Ok(SignUpOutcome::ConfirmationRequired(user)) => {
                tracing::info!(user_id = %user.id, "sign-up awaiting email confirmation");
                self.notices.post(Notice::confirm_email());
                Ok(AuthOutcome::ConfirmationSent)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Sign out
    ///
    /// The local session is always dropped; a failure to revoke it remotely
    /// is only logged.
    pub async fn sign_out(&self) -> Result<()> {
        let session = self.session.clear().ok_or(AuthError::NoSession)?;

        if let Err(e) = self.api.sign_out(&session.access_token).await {
            tracing::warn!(user_id = %session.user_id, error = %e, "remote sign-out failed");
        } else {
            tracing::info!(user_id = %session.user_id, "signed out");
        }
        Ok(())
    }

    fn start_session(&self, auth: AuthSession) -> Session {
        let session = Session {
            user_id: auth.user.id,
            email: auth.user.email,
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
        };
        self.session.set(session.clone());
        session
    }

    fn report(&self, error: AuthError) -> AuthError {
        tracing::warn!(error = %error, "authentication failed");
        self.notices.post(Notice::error(error.user_message()));
        error
    }
}

fn credentials<'a>(email: &'a str, password: &'a str) -> Result<(&'a str, &'a str)> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok((email, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use nav_client::auth::AuthUser;
    use nav_client::HttpError;

    mock! {
        pub Api {}

        #[async_trait]
        impl AuthApi for Api {
            async fn sign_in_with_password(&self, email: &str, password: &str) -> nav_client::Result<AuthSession>;
            async fn sign_up(&self, email: &str, password: &str) -> nav_client::Result<SignUpOutcome>;
            async fn sign_out(&self, access_token: &str) -> nav_client::Result<()>;
        }
    }

    fn auth_session() -> AuthSession {
        AuthSession {
            access_token: "jwt".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_in: Some(3600),
            user: AuthUser {
                id: "user-1".to_string(),
                email: Some("driver@example.com".to_string()),
            },
        }
    }

    fn service(api: MockApi) -> AuthService {
        AuthService::new(Arc::new(api), SessionStore::new(), NoticeCenter::new())
    }

    #[test]
    fn test_mode_labels() {
        let mut form = AuthForm::default();
        assert_eq!(form.mode.title(), "Welcome Back");
        assert_eq!(form.mode.submit_label(), "Login");

        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::SignUp);
        assert_eq!(form.mode.title(), "Create Account");
        assert_eq!(form.mode.switch_label(), "Already have an account? Login");
    }

    #[tokio::test]
    async fn test_sign_in_starts_session() {
        let mut api = MockApi::new();
        api.expect_sign_in_with_password()
            .withf(|email, password| email == "driver@example.com" && password == "secret")
            .times(1)
            .returning(|_, _| Ok(auth_session()));
        let service = service(api);

        let outcome = service
            .submit(&AuthForm::sign_in(" driver@example.com ", "secret"))
            .await
            .unwrap();

        assert!(matches!(outcome, AuthOutcome::SignedIn(ref s) if s.user_id == "user-1"));
        assert!(service.session().is_signed_in());
        assert_eq!(service.session().identity().unwrap().access_token, "jwt");
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_request() {
        let mut api = MockApi::new();
        api.expect_sign_in_with_password().never();
        api.expect_sign_up().never();
        let service = service(api);
        let mut notices = service.notices.subscribe();

        let err = service.sign_in("", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        let err = service.sign_up("driver@example.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        assert_eq!(notices.recv().await.unwrap().title, "Error");
        assert!(!service.session().is_signed_in());
    }

    #[tokio::test]
    async fn test_rejected_sign_in_shows_service_message() {
        let mut api = MockApi::new();
        api.expect_sign_in_with_password().returning(|_, _| {
            Err(nav_client::Error::Http(HttpError::new(
                400,
                "invalid_grant",
                "Invalid login credentials",
            )))
        });
        let service = service(api);
        let mut notices = service.notices.subscribe();

        assert!(service.sign_in("driver@example.com", "wrong").await.is_err());

        assert_eq!(
            notices.recv().await.unwrap(),
            Notice::error("Invalid login credentials")
        );
        assert!(!service.session().is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_up_requiring_confirmation() {
        let mut api = MockApi::new();
        api.expect_sign_up().times(1).returning(|_, _| {
            Ok(SignUpOutcome::ConfirmationRequired(AuthUser {
                id: "user-2".to_string(),
                email: Some("new@example.com".to_string()),
            }))
        });
        let service = service(api);
        let mut notices = service.notices.subscribe();

        let outcome = service
            .submit(&AuthForm::sign_up("new@example.com", "secret"))
            .await
            .unwrap();

        assert_eq!(outcome, AuthOutcome::ConfirmationSent);
        assert_eq!(notices.recv().await.unwrap(), Notice::confirm_email());
        assert!(!service.session().is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_up_with_immediate_session() {
        let mut api = MockApi::new();
        api.expect_sign_up()
            .returning(|_, _| Ok(SignUpOutcome::SignedIn(auth_session())));
        let service = service(api);

        let outcome = service.sign_up("driver@example.com", "secret").await.unwrap();

        assert!(matches!(outcome, AuthOutcome::SignedIn(_)));
        assert!(service.session().is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_even_if_remote_fails() {
        let mut api = MockApi::new();
        api.expect_sign_in_with_password()
            .returning(|_, _| Ok(auth_session()));
        api.expect_sign_out()
            .withf(|token| token == "jwt")
            .times(1)
            .returning(|_| Err(nav_client::Error::Http(HttpError::new(0, "NetworkError", "offline"))));
        let service = service(api);

        service.sign_in("driver@example.com", "secret").await.unwrap();
        service.sign_out().await.unwrap();

        assert!(!service.session().is_signed_in());
        assert!(matches!(service.sign_out().await, Err(AuthError::NoSession)));
    }
}
