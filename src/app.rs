//! Application composition
//!
//! Wires the remote clients, the shared stores and the services together and
//! owns the navigator. Tracking follows the map screen: it starts when the
//! map is opened and stops once the map leaves the navigation stack.

use crate::config::{AppConfig, ConfigError};
use app_core::auth::{AuthError, AuthForm, AuthOutcome, AuthService};
use app_core::map::MapController;
use app_core::places::PlaceResolver;
use app_core::routing::RoutePlanner;
use app_core::tracker::{
    LocationPermission, LocationTracker, PositionSource, TrackingError, TrackingHandle,
};
use app_state::map::MapStore;
use app_state::notice::NoticeCenter;
use app_state::session::{Session, SessionStore};
use app_state::settings::SettingsStore;
use app_ui::navigation::{Navigator, Screen, StartAction};
use nav_client::auth::{AuthApi, GoTrueClient};
use nav_client::geocode::{NominatimClient, PlaceLookup};
use nav_client::location_log::{LocationLog, SupabaseLocationLog};
use nav_client::routing::{OsrmClient, RouteService};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling the application
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration problem
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A client could not be built
    #[error("Client error: {0}")]
    Client(#[from] nav_client::Error),
}

/// Result type for application assembly
pub type Result<T> = std::result::Result<T, AppError>;

/// Remote services the app talks to
#[derive(Clone)]
pub struct Services {
    /// Place lookup
    pub lookup: Arc<dyn PlaceLookup>,
    /// Routing
    pub router: Arc<dyn RouteService>,
    /// Remote location log
    pub location_log: Arc<dyn LocationLog>,
    /// Email/password authentication
    pub auth: Arc<dyn AuthApi>,
}

impl Services {
    /// Build the HTTP clients described by `config`
    pub fn remote(config: &AppConfig) -> Result<Self> {
        let supabase = config.require_supabase()?;
        let supabase_client = config.client(&supabase.url);

        Ok(Self {
            lookup: Arc::new(NominatimClient::new(config.client(&config.nominatim_url))?),
            router: Arc::new(OsrmClient::new(config.client(&config.osrm_url))?),
            location_log: Arc::new(SupabaseLocationLog::new(
                supabase_client.clone(),
                &supabase.anon_key,
            )?),
            auth: Arc::new(GoTrueClient::new(supabase_client, &supabase.anon_key)?),
        })
    }
}

/// Device capabilities provided by the host platform
#[derive(Clone)]
pub struct Platform {
    /// Position updates
    pub positions: Arc<dyn PositionSource>,
    /// Location permission prompt
    pub permission: Arc<dyn LocationPermission>,
}

/// The assembled application
pub struct App {
    map_store: MapStore,
    session: SessionStore,
    settings: SettingsStore,
    notices: NoticeCenter,
    controller: MapController,
    auth: AuthService,
    tracker: LocationTracker,
    navigator: Navigator,
    tracking: Option<TrackingHandle>,
    permission_denied: bool,
}

impl App {
    /// Assemble the application
    pub fn new(services: Services, platform: Platform, config: &AppConfig) -> Self {
        let map_store = MapStore::new();
        let session = SessionStore::new();
        let notices = NoticeCenter::new();

        let controller = MapController::new(
            map_store.clone(),
            notices.clone(),
            PlaceResolver::new(services.lookup),
            RoutePlanner::new(services.router),
        );
        let auth = AuthService::new(services.auth, session.clone(), notices.clone());
        let tracker = LocationTracker::new(
            platform.positions,
            platform.permission,
            services.location_log,
            session.clone(),
            map_store.clone(),
            notices.clone(),
        )
        .with_config(config.tracker.clone());

        Self {
            map_store,
            session,
            settings: SettingsStore::new(),
            notices,
            controller,
            auth,
            tracker,
            navigator: Navigator::new(),
            tracking: None,
            permission_denied: false,
        }
    }

    /// Map state store
    pub fn map_store(&self) -> &MapStore {
        &self.map_store
    }

    /// Session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Theme settings
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Notice center
    pub fn notices(&self) -> &NoticeCenter {
        &self.notices
    }

    /// Map screen controller
    pub fn map(&self) -> &MapController {
        &self.controller
    }

    /// Navigator
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Whether location tracking is running
    pub fn is_tracking(&self) -> bool {
        self.tracking.as_ref().is_some_and(TrackingHandle::is_active)
    }

    /// Mark the start of session restore; the navigator shows nothing meanwhile
    pub fn begin_restore(&mut self) {
        self.navigator.set_loading(true);
    }

    /// Finish session restore with the persisted session, if any
    pub fn finish_restore(&mut self, session: Option<Session>) {
        if let Some(session) = session {
            self.session.set(session);
        }
        self.navigator.set_loading(false);
    }

    /// Handle a start screen button
    pub async fn press_start(&mut self, action: StartAction) {
        match action.target() {
            Screen::Map => self.open_map().await,
            screen => self.navigate(screen).await,
        }
    }

    /// Show the map screen and start tracking
    ///
    /// Permission denial leaves the map usable without a user position. The
    /// user is not asked again until the map has left the stack.
    pub async fn open_map(&mut self) {
        self.navigator.navigate(Screen::Map);
        if self.tracking.is_some() || self.permission_denied {
            return;
        }

        match self.tracker.start().await {
            Ok(handle) => self.tracking = Some(handle),
            Err(TrackingError::PermissionDenied) => self.permission_denied = true,
            Err(e) => tracing::warn!(error = %e, "could not start location tracking"),
        }
    }

    /// Navigate to `screen`
    pub async fn navigate(&mut self, screen: Screen) {
        if screen == Screen::Map {
            return self.open_map().await;
        }
        self.navigator.navigate(screen);
        self.sync_tracking().await;
    }

    /// Go back one screen
    pub async fn go_back(&mut self) -> bool {
        let popped = self.navigator.go_back();
        self.sync_tracking().await;
        popped
    }

    /// Submit the auth form; a successful sign-in opens the map
    pub async fn submit_auth(&mut self, form: &AuthForm) -> std::result::Result<AuthOutcome, AuthError> {
        let outcome = self.auth.submit(form).await?;
        if let AuthOutcome::SignedIn(_) = outcome {
            self.open_map().await;
        }
        Ok(outcome)
    }

    /// Sign out the current user
    pub async fn sign_out(&mut self) -> std::result::Result<(), AuthError> {
        self.auth.sign_out().await
    }

    /// Stop tracking
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.tracking.take() {
            handle.shutdown().await;
        }
    }

    async fn sync_tracking(&mut self) {
        if !self.navigator.screens().contains(&Screen::Map) {
            self.permission_denied = false;
            self.shutdown().await;
        }
    }
}
