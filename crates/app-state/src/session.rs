//! Current authentication session
//!
//! Holds the signed-in user, if any. Other components only ask whether an
//! identity is present; sign-in and sign-out are driven by the auth service.

use nav_client::types::Identity;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// A signed-in user session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User id
    pub user_id: String,
    /// Email address
    pub email: Option<String>,
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: Option<String>,
}

impl Session {
    /// Identity used for requests made as this user
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id.clone(), self.access_token.clone())
    }
}

/// Shared holder of the current session
///
/// Cloning the store yields a handle to the same session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    signed_in_tx: Arc<watch::Sender<bool>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (signed_in_tx, _) = watch::channel(false);
        Self {
            current: Arc::new(RwLock::new(None)),
            signed_in_tx: Arc::new(signed_in_tx),
        }
    }

    /// Replace the current session
    pub fn set(&self, session: Session) {
        tracing::debug!(user_id = %session.user_id, "session started");
        *self.current.write() = Some(session);
        self.signed_in_tx.send_replace(true);
    }

    /// Drop the current session, returning it
    pub fn clear(&self) -> Option<Session> {
        let previous = self.current.write().take();
        self.signed_in_tx.send_replace(false);
        previous
    }

    /// Current session, if any
    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    /// Identity of the signed-in user, if any
    pub fn identity(&self) -> Option<Identity> {
        self.current.read().as_ref().map(Session::identity)
    }

    /// Whether a user is signed in
    pub fn is_signed_in(&self) -> bool {
        self.current.read().is_some()
    }

    /// Subscribe to sign-in/sign-out changes
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signed_in_tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
