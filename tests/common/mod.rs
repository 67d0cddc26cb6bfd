//! In-memory stand-ins for the remote services and the device

#![allow(dead_code)]

use app_core::tracker::{
    LocationPermission, PermissionStatus, PositionEvent, PositionFix, PositionSource,
    TrackerConfig, TrackingError,
};
use async_trait::async_trait;
use drive_os::{App, AppConfig, Platform, Services};
use nav_client::auth::{AuthApi, AuthSession, AuthUser, SignUpOutcome};
use nav_client::geocode::{Place, PlaceLookup};
use nav_client::location_log::LocationLog;
use nav_client::routing::{RouteGeometry, RouteService};
use nav_client::types::{Coordinate, Identity};
use nav_client::HttpError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub fn munich() -> Coordinate {
    Coordinate::new(48.1, 11.6)
}

pub fn berlin() -> Coordinate {
    Coordinate::new(52.52, 13.405)
}

/// Place lookup over a fixed gazetteer
#[derive(Default)]
pub struct Gazetteer {
    places: HashMap<String, Coordinate>,
    pub queries: Mutex<Vec<String>>,
}

impl Gazetteer {
    pub fn with(mut self, name: &str, coordinate: Coordinate) -> Self {
        self.places.insert(name.to_string(), coordinate);
        self
    }
}

#[async_trait]
impl PlaceLookup for Gazetteer {
    async fn lookup(&self, query: &str) -> nav_client::Result<Option<Place>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.places.get(query).map(|&coordinate| Place {
            coordinate,
            display_name: Some(query.to_string()),
        }))
    }
}

/// Router that returns a three-point path, or fails when told to
#[derive(Default)]
pub struct StraightRouter {
    pub down: bool,
    pub calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

#[async_trait]
impl RouteService for StraightRouter {
    async fn route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> nav_client::Result<Option<RouteGeometry>> {
        self.calls.lock().unwrap().push((start, end));
        if self.down {
            return Err(HttpError::new(503, "ServiceUnavailable", "router down").into());
        }
        let midpoint = Coordinate::new(
            (start.latitude + end.latitude) / 2.0,
            (start.longitude + end.longitude) / 2.0,
        );
        Ok(Some(RouteGeometry {
            path: vec![start, midpoint, end],
            distance: Some(500_000.0),
            duration: Some(18_000.0),
        }))
    }
}

/// Location log that records entries and reports them on a channel
pub struct RecordingLog {
    pub entries: Mutex<Vec<(Identity, Coordinate)>>,
    notify: mpsc::UnboundedSender<Coordinate>,
}

impl RecordingLog {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Coordinate>) {
        let (notify, rx) = mpsc::unbounded_channel();
        (
            Self {
                entries: Mutex::new(Vec::new()),
                notify,
            },
            rx,
        )
    }
}

#[async_trait]
impl LocationLog for RecordingLog {
    async fn append(&self, identity: &Identity, coordinate: Coordinate) -> nav_client::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .push((identity.clone(), coordinate));
        let _ = self.notify.send(coordinate);
        Ok(())
    }
}

/// Auth backend with a single account
pub struct SingleAccount {
    pub email: String,
    pub password: String,
}

impl Default for SingleAccount {
    fn default() -> Self {
        Self {
            email: "driver@example.com".to_string(),
            password: "secret".to_string(),
        }
    }
}

#[async_trait]
impl AuthApi for SingleAccount {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> nav_client::Result<AuthSession> {
        if email != self.email || password != self.password {
            return Err(HttpError::new(400, "invalid_grant", "Invalid login credentials").into());
        }
        Ok(AuthSession {
            access_token: "jwt".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_in: Some(3600),
            user: AuthUser {
                id: "user-1".to_string(),
                email: Some(email.to_string()),
            },
        })
    }

    async fn sign_up(&self, email: &str, _password: &str) -> nav_client::Result<SignUpOutcome> {
        Ok(SignUpOutcome::ConfirmationRequired(AuthUser {
            id: "user-2".to_string(),
            email: Some(email.to_string()),
        }))
    }

    async fn sign_out(&self, _access_token: &str) -> nav_client::Result<()> {
        Ok(())
    }
}

/// Position source fed by the test
pub struct FakeGps {
    rx: Mutex<Option<mpsc::Receiver<PositionEvent>>>,
}

impl FakeGps {
    pub fn new() -> (Self, GpsFeed) {
        let (tx, rx) = mpsc::channel(16);
        (
            Self {
                rx: Mutex::new(Some(rx)),
            },
            GpsFeed { tx },
        )
    }
}

#[async_trait]
impl PositionSource for FakeGps {
    async fn watch(
        &self,
        _config: &TrackerConfig,
    ) -> Result<mpsc::Receiver<PositionEvent>, TrackingError> {
        self.rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| TrackingError::Source("already watching".to_string()))
    }
}

/// Test side of [`FakeGps`]
pub struct GpsFeed {
    tx: mpsc::Sender<PositionEvent>,
}

impl GpsFeed {
    pub async fn fix(&self, coordinate: Coordinate) {
        self.tx
            .send(PositionEvent::Fix(PositionFix::now(coordinate)))
            .await
            .unwrap();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Permission prompt with a fixed answer
pub struct FixedPermission(pub PermissionStatus);

#[async_trait]
impl LocationPermission for FixedPermission {
    async fn request(&self) -> PermissionStatus {
        self.0
    }
}

/// A fully wired app over fakes
pub struct TestApp {
    pub app: App,
    pub gps: GpsFeed,
    pub uploads: mpsc::UnboundedReceiver<Coordinate>,
    pub log: Arc<RecordingLog>,
    pub router: Arc<StraightRouter>,
}

pub fn test_app(permission: PermissionStatus, router: StraightRouter) -> TestApp {
    let (gps_source, gps) = FakeGps::new();
    let (log, uploads) = RecordingLog::new();
    let log = Arc::new(log);
    let router = Arc::new(router);

    let services = Services {
        lookup: Arc::new(Gazetteer::default().with("Berlin", berlin())),
        router: router.clone(),
        location_log: log.clone(),
        auth: Arc::new(SingleAccount::default()),
    };
    let platform = Platform {
        positions: Arc::new(gps_source),
        permission: Arc::new(FixedPermission(permission)),
    };

    TestApp {
        app: App::new(services, platform, &AppConfig::default()),
        gps,
        uploads,
        log,
        router,
    }
}
