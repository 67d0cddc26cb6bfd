//! Map view state
//!
//! The map screen's state (user position, destination, route and viewport)
//! lives in a single [`MapStore`]. Every change goes through
//! [`MapStore::dispatch`] as a [`MapAction`]; the store applies it with
//! [`MapState::reduce`] under one lock and publishes the resulting
//! [`MapEvent`]s.
//!
//! Search and route responses carry the generation number that was current
//! when their request was issued. A response whose generation is no longer the
//! latest for its operation is discarded, so a slow stale response can never
//! overwrite a newer result.

use nav_client::types::{Coordinate, Viewport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Request generation number
pub type Generation = u64;

/// Animated camera move to a new viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraMove {
    /// Viewport to animate to
    pub target: Viewport,
    /// Animation duration
    pub duration: Duration,
}

impl CameraMove {
    /// Animation duration for explicit recenters
    pub const DURATION: Duration = Duration::from_millis(1000);

    /// Animate to `target` with the standard duration
    pub fn to(target: Viewport) -> Self {
        Self {
            target,
            duration: Self::DURATION,
        }
    }
}

/// A route the store wants computed
///
/// Issued when a destination is accepted while the user position is known.
/// `start` is the user position at that moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    /// Generation the response must carry
    pub generation: Generation,
    /// User position when the destination was accepted
    pub start: Coordinate,
    /// Accepted destination
    pub end: Coordinate,
}

/// State transition messages
#[derive(Debug, Clone, PartialEq)]
pub enum MapAction {
    /// The device reported a new position
    PositionUpdated(Coordinate),
    /// A place search was issued
    SearchStarted,
    /// A place search resolved to a destination
    DestinationResolved {
        /// Generation from [`Transition::SearchStarted`]
        generation: Generation,
        /// Resolved destination
        destination: Coordinate,
    },
    /// A place search ended without a destination (no match or failure)
    SearchSettled {
        /// Generation from [`Transition::SearchStarted`]
        generation: Generation,
    },
    /// A route lookup returned a path
    RouteResolved {
        /// Generation from the [`RouteRequest`]
        generation: Generation,
        /// Path in travel order
        path: Vec<Coordinate>,
    },
    /// A route lookup failed or found no route
    RouteFailed {
        /// Generation from the [`RouteRequest`]
        generation: Generation,
        /// Failure description
        reason: String,
    },
    /// Move the camera to the user's position
    CenterOnUser,
}

/// Result of dispatching an action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// The action was applied
    Applied,
    /// The action had nothing to act on
    Unchanged,
    /// The action answered an outdated request and was dropped
    Stale,
    /// A search was registered under this generation
    SearchStarted(Generation),
    /// A destination was accepted and needs a route
    RouteRequested(RouteRequest),
}

/// Change notifications for renderers and observers
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// User marker moved
    UserPositionChanged(Coordinate),
    /// Destination marker moved
    DestinationChanged(Coordinate),
    /// Route polyline replaced
    RouteChanged(Vec<Coordinate>),
    /// Search loading indicator toggled
    SearchingChanged(bool),
    /// Camera animation requested
    CameraMoved(CameraMove),
    /// A route lookup failed; state is unchanged
    RouteFailed {
        /// Generation of the failed request
        generation: Generation,
        /// Failure description
        reason: String,
    },
}

impl MapEvent {
    /// Whether this event reflects a state mutation
    pub fn changes_state(&self) -> bool {
        !matches!(self, MapEvent::RouteFailed { .. })
    }
}

/// What the map should draw on top of the tiles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlays {
    /// Marker at the user's position
    pub user_marker: Option<Coordinate>,
    /// Marker at the destination
    pub destination_marker: Option<Coordinate>,
    /// Route polyline, only when a route exists
    pub route_polyline: Option<Vec<Coordinate>>,
}

/// Map screen state
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    user_position: Option<Coordinate>,
    destination: Option<Coordinate>,
    route: Vec<Coordinate>,
    viewport: Viewport,
    searching: bool,
    search_generation: Generation,
    route_generation: Generation,
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MapState {
    /// Create an empty state showing `viewport`
    pub fn new(viewport: Viewport) -> Self {
        Self {
            user_position: None,
            destination: None,
            route: Vec::new(),
            viewport,
            searching: false,
            search_generation: 0,
            route_generation: 0,
        }
    }

    /// Latest known user position
    pub fn user_position(&self) -> Option<Coordinate> {
        self.user_position
    }

    /// Current destination
    pub fn destination(&self) -> Option<Coordinate> {
        self.destination
    }

    /// Current route path
    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether a place search is in flight
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Generation of the latest search
    pub fn search_generation(&self) -> Generation {
        self.search_generation
    }

    /// Generation of the latest route request
    pub fn route_generation(&self) -> Generation {
        self.route_generation
    }

    /// Overlays derived from the current state
    pub fn overlays(&self) -> Overlays {
        Overlays {
            user_marker: self.user_position,
            destination_marker: self.destination,
            route_polyline: (!self.route.is_empty()).then(|| self.route.clone()),
        }
    }

    fn begin_search(&mut self) -> Generation {
        self.search_generation += 1;
        self.searching = true;
        self.search_generation
    }

    /// Apply an action, returning the transition and the events it produced
    pub fn reduce(&mut self, action: MapAction) -> (Transition, Vec<MapEvent>) {
        match action {
            MapAction::PositionUpdated(position) => {
                self.user_position = Some(position);
                (Transition::Applied, vec![MapEvent::UserPositionChanged(position)])
            }

            MapAction::SearchStarted => (
                Transition::SearchStarted(self.begin_search()),
                vec![MapEvent::SearchingChanged(true)],
            ),

            MapAction::DestinationResolved {
                generation,
                destination,
            } => {
                if generation != self.search_generation {
                    return (Transition::Stale, Vec::new());
                }

                self.destination = Some(destination);
                self.viewport = Viewport::around(destination, Viewport::SEARCH_RESULT_SPAN);
                self.searching = false;
                // Routes requested for an older destination are now outdated.
                self.route_generation += 1;

                let events = vec![
                    MapEvent::DestinationChanged(destination),
                    MapEvent::SearchingChanged(false),
                    MapEvent::CameraMoved(CameraMove::to(self.viewport)),
                ];

                let transition = match self.user_position {
                    Some(start) => Transition::RouteRequested(RouteRequest {
                        generation: self.route_generation,
                        start,
                        end: destination,
                    }),
                    None => Transition::Applied,
                };

                (transition, events)
            }

            MapAction::SearchSettled { generation } => {
                if generation != self.search_generation {
                    return (Transition::Stale, Vec::new());
                }

                self.searching = false;
                (Transition::Applied, vec![MapEvent::SearchingChanged(false)])
            }

            MapAction::RouteResolved { generation, path } => {
                if generation != self.route_generation {
                    return (Transition::Stale, Vec::new());
                }

                self.route = path;
                (Transition::Applied, vec![MapEvent::RouteChanged(self.route.clone())])
            }

            MapAction::RouteFailed { generation, reason } => {
                if generation != self.route_generation {
                    return (Transition::Stale, Vec::new());
                }

                (
                    Transition::Applied,
                    vec![MapEvent::RouteFailed { generation, reason }],
                )
            }

            MapAction::CenterOnUser => match self.user_position {
                Some(position) => {
                    self.viewport = Viewport::around(position, Viewport::USER_FOCUS_SPAN);
                    (
                        Transition::Applied,
                        vec![MapEvent::CameraMoved(CameraMove::to(self.viewport))],
                    )
                }
                None => (Transition::Unchanged, Vec::new()),
            },
        }
    }
}

/// Observable container for [`MapState`]
///
/// # Example
///
/// ```
/// use app_state::map::{MapAction, MapStore};
/// use nav_client::types::Coordinate;
///
/// let store = MapStore::new();
/// store.dispatch(MapAction::PositionUpdated(Coordinate::new(48.1, 11.6)));
/// assert_eq!(store.snapshot().user_position(), Some(Coordinate::new(48.1, 11.6)));
/// ```
#[derive(Debug, Clone)]
pub struct MapStore {
    state_tx: Arc<watch::Sender<MapState>>,
    events_tx: broadcast::Sender<MapEvent>,
}

impl MapStore {
    /// Create a store with the default viewport
    pub fn new() -> Self {
        Self::with_state(MapState::default())
    }

    /// Create a store starting from `state`
    pub fn with_state(state: MapState) -> Self {
        let (state_tx, _) = watch::channel(state);
        let (events_tx, _) = broadcast::channel(64);

        Self {
            state_tx: Arc::new(state_tx),
            events_tx,
        }
    }

    /// Apply an action and publish its events
    pub fn dispatch(&self, action: MapAction) -> Transition {
        let mut result = (Transition::Unchanged, Vec::new());

        self.state_tx.send_if_modified(|state| {
            result = state.reduce(action);
            result.1.iter().any(MapEvent::changes_state)
        });

        let (transition, events) = result;

        if transition == Transition::Stale {
            tracing::debug!("discarded stale map response");
        }

        for event in events {
            let _ = self.events_tx.send(event);
        }

        transition
    }

    /// Begin a search and return its generation
    pub fn start_search(&self) -> Generation {
        let mut generation = 0;
        self.state_tx.send_modify(|state| generation = state.begin_search());
        let _ = self.events_tx.send(MapEvent::SearchingChanged(true));
        generation
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> MapState {
        self.state_tx.borrow().clone()
    }

    /// Latest known user position
    pub fn user_position(&self) -> Option<Coordinate> {
        self.state_tx.borrow().user_position()
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<MapState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to change events
    pub fn subscribe_events(&self) -> broadcast::Receiver<MapEvent> {
        self.events_tx.subscribe()
    }
}

impl Default for MapStore {
    fn default() -> Self {
        Self::new()
    }
}
