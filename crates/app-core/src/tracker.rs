//! Live location tracking
//!
//! The tracker subscribes to the device's position stream once location
//! permission is granted. Every fix overwrites the user position in the map
//! store and, while a user is signed in, is uploaded to the remote location
//! log as a detached task. Uploads are fire-and-forget: a failure is logged
//! and never retried, and never holds up the next fix.
//!
//! Tracking is tied to the returned [`TrackingHandle`]; stopping or dropping
//! it tears down the subscription.

use app_state::map::{MapAction, MapStore};
use app_state::notice::{Notice, NoticeCenter};
use app_state::session::SessionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nav_client::location_log::LocationLog;
use nav_client::types::Coordinate;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Tracking errors
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// The user refused location access
    #[error("Location permission denied")]
    PermissionDenied,

    /// The position source could not be started
    #[error("Position source error: {0}")]
    Source(String),
}

/// Result type for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Requested positioning accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accuracy {
    /// GPS-level accuracy
    High,
    /// Network/Wi-Fi accuracy
    Balanced,
    /// Coarse accuracy
    Low,
}

impl std::str::FromStr for Accuracy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Accuracy::High),
            "balanced" => Ok(Accuracy::Balanced),
            "low" => Ok(Accuracy::Low),
            other => Err(format!("unknown accuracy: {other}")),
        }
    }
}

/// Parameters handed to the position source
///
/// These bound how often the platform may deliver fixes and how far the
/// device must move between them. The tracker itself does no filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Requested accuracy
    pub accuracy: Accuracy,
    /// Minimum movement between fixes, in meters
    pub min_distance_m: f64,
    /// Desired interval between fixes
    pub interval: Duration,
    /// Shortest interval the platform may use
    pub fastest_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::High,
            min_distance_m: 10.0,
            interval: Duration::from_secs(10),
            fastest_interval: Duration::from_secs(5),
        }
    }
}

impl TrackerConfig {
    /// Set the requested accuracy
    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set the minimum movement between fixes
    pub fn with_min_distance(mut self, meters: f64) -> Self {
        self.min_distance_m = meters;
        self
    }

    /// Set the desired and fastest intervals
    pub fn with_intervals(mut self, interval: Duration, fastest: Duration) -> Self {
        self.interval = interval;
        self.fastest_interval = fastest;
        self
    }
}

/// A position fix from the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Reported position
    pub coordinate: Coordinate,
    /// When the fix was taken
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    /// A fix taken now
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            timestamp: Utc::now(),
        }
    }
}

/// Items delivered by a position source
#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    /// A new fix
    Fix(PositionFix),
    /// A transient error; the stream continues
    Error(String),
}

/// Device location service
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Start delivering position events
    ///
    /// The subscription ends when the returned receiver is dropped.
    async fn watch(&self, config: &TrackerConfig) -> Result<mpsc::Receiver<PositionEvent>>;
}

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Location access granted
    Granted,
    /// Location access refused
    Denied,
}

/// Runtime location permission prompt
#[async_trait]
pub trait LocationPermission: Send + Sync {
    /// Ask the user for location access
    async fn request(&self) -> PermissionStatus;
}

/// Permission gate for platforms that prompt on their own when the position
/// source starts
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplicitPermission;

#[async_trait]
impl LocationPermission for ImplicitPermission {
    async fn request(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }
}

/// Live location tracker
pub struct LocationTracker {
    source: Arc<dyn PositionSource>,
    permission: Arc<dyn LocationPermission>,
    log: Arc<dyn LocationLog>,
    session: SessionStore,
    store: MapStore,
    notices: NoticeCenter,
    config: TrackerConfig,
}

impl LocationTracker {
    /// Create a tracker with the default configuration
    pub fn new(
        source: Arc<dyn PositionSource>,
        permission: Arc<dyn LocationPermission>,
        log: Arc<dyn LocationLog>,
        session: SessionStore,
        store: MapStore,
        notices: NoticeCenter,
    ) -> Self {
        Self {
            source,
            permission,
            log,
            session,
            store,
            notices,
            config: TrackerConfig::default(),
        }
    }

    /// Use a different configuration
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Request permission and start tracking
    ///
    /// A denied permission posts a notice and returns
    /// [`TrackingError::PermissionDenied`]; tracking is not attempted again.
    pub async fn start(&self) -> Result<TrackingHandle> {
        if self.permission.request().await == PermissionStatus::Denied {
            tracing::info!("location permission denied, tracking disabled");
            self.notices.post(Notice::permission_denied());
            return Err(TrackingError::PermissionDenied);
        }

        let mut events = self.source.watch(&self.config).await?;
        tracing::info!(config = ?self.config, "location tracking started");

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let active = Arc::new(AtomicBool::new(true));
        let sink = FixSink {
            store: self.store.clone(),
            session: self.session.clone(),
            log: Arc::clone(&self.log),
        };

        let task_active = Arc::clone(&active);
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(PositionEvent::Fix(fix)) => sink.accept(fix),
                        Some(PositionEvent::Error(error)) => {
                            tracing::warn!(%error, "position source error");
                        }
                        None => break,
                    },
                    _ = &mut stop_rx => break,
                }
            }

            task_active.store(false, Ordering::SeqCst);
            tracing::info!("location tracking stopped");
        });

        Ok(TrackingHandle {
            stop_tx: Some(stop_tx),
            task: Some(task),
            active,
        })
    }
}

/// Applies fixes to the store and schedules uploads
struct FixSink {
    store: MapStore,
    session: SessionStore,
    log: Arc<dyn LocationLog>,
}

impl FixSink {
    fn accept(&self, fix: PositionFix) {
        let coordinate = fix.coordinate;
        tracing::debug!(%coordinate, timestamp = %fix.timestamp, "position fix");

        self.store.dispatch(MapAction::PositionUpdated(coordinate));

        if let Some(identity) = self.session.identity() {
            let log = Arc::clone(&self.log);
            tokio::spawn(async move {
                if let Err(e) = log.append(&identity, coordinate).await {
                    tracing::warn!(error = %e, "location upload failed");
                }
            });
        }
    }
}

/// Handle for a running tracking session
///
/// When dropped, tracking stops.
pub struct TrackingHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    active: Arc<AtomicBool>,
}

impl TrackingHandle {
    /// Whether the subscription is still running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop tracking
    pub fn stop(mut self) {
        self.signal_stop();
    }

    /// Stop tracking and wait for the subscription to be torn down
    pub async fn shutdown(mut self) {
        self.signal_stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    fn signal_stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
