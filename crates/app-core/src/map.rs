//! Map screen controller
//!
//! Drives the search → destination → route flow on top of the [`MapStore`].
//! Every search and every route request is tagged with a generation by the
//! store; responses that arrive after a newer request was issued are
//! discarded there, so the controller never has to reason about ordering.

use crate::places::{PlaceResolver, Resolution};
use crate::routing::RoutePlanner;
use app_state::map::{MapAction, MapStore, RouteRequest, Transition};
use app_state::notice::{Notice, NoticeCenter};
use nav_client::types::Coordinate;
use tokio::task::JoinHandle;

/// Result of a search submitted from the search bar
#[derive(Debug)]
pub enum SearchOutcome {
    /// Blank query; nothing happened
    Skipped,
    /// No place matched; the user was told
    NotFound,
    /// The lookup failed; the user was told
    Failed,
    /// A newer search superseded this one before it finished
    Stale,
    /// The destination was set
    Resolved {
        /// New destination
        destination: Coordinate,
        /// Route request started for it, when the user position was known
        routing: Option<JoinHandle<()>>,
    },
}

/// Coordinates search, destination and routing for the map screen
#[derive(Clone)]
pub struct MapController {
    store: MapStore,
    notices: NoticeCenter,
    resolver: PlaceResolver,
    planner: RoutePlanner,
}

impl MapController {
    /// Create a controller
    pub fn new(
        store: MapStore,
        notices: NoticeCenter,
        resolver: PlaceResolver,
        planner: RoutePlanner,
    ) -> Self {
        Self {
            store,
            notices,
            resolver,
            planner,
        }
    }

    /// The store this controller writes to
    pub fn store(&self) -> &MapStore {
        &self.store
    }

    /// Search for `query` and make the first match the destination
    ///
    /// On success the camera moves to the destination and, when the user
    /// position is known, a route is requested in the background. Not-found
    /// and failed lookups post a notice unless a newer search has started.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Skipped;
        }

        let generation = self.store.start_search();
        tracing::debug!(query, generation, "search started");

        match self.resolver.resolve(query).await {
            Ok(Resolution::Found(place)) => {
                let destination = place.coordinate;
                let transition = self.store.dispatch(MapAction::DestinationResolved {
                    generation,
                    destination,
                });

                match transition {
                    Transition::Stale => SearchOutcome::Stale,
                    Transition::RouteRequested(request) => {
                        tracing::info!(%destination, "destination set, requesting route");
                        SearchOutcome::Resolved {
                            destination,
                            routing: Some(self.spawn_route(request)),
                        }
                    }
                    _ => {
                        tracing::info!(%destination, "destination set without user position");
                        SearchOutcome::Resolved {
                            destination,
                            routing: None,
                        }
                    }
                }
            }
            Ok(Resolution::NotFound) => {
                self.settle(generation, Notice::not_found(), SearchOutcome::NotFound)
            }
            Ok(Resolution::Skipped) => {
                self.store.dispatch(MapAction::SearchSettled { generation });
                SearchOutcome::Skipped
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "search failed");
                self.settle(generation, Notice::search_failed(), SearchOutcome::Failed)
            }
        }
    }

    /// Fetch the route for `request` and apply it unless it is outdated
    ///
    /// Failures leave the current route in place and are reported as a
    /// [`MapEvent::RouteFailed`](app_state::map::MapEvent::RouteFailed)
    /// rather than a notice.
    pub async fn plan_route(&self, request: RouteRequest) {
        let generation = request.generation;
        let action = match self.planner.plan(request.start, request.end).await {
            Ok(route) => {
                tracing::debug!(
                    generation,
                    points = route.path.len(),
                    distance = ?route.distance,
                    duration = ?route.duration,
                    "route received"
                );
                MapAction::RouteResolved {
                    generation,
                    path: route.path,
                }
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "route request failed");
                MapAction::RouteFailed {
                    generation,
                    reason: e.to_string(),
                }
            }
        };

        if self.store.dispatch(action) == Transition::Stale {
            tracing::debug!(generation, "discarded outdated route response");
        }
    }

    /// Move the camera to the user's position
    ///
    /// Returns `false` when no position is known yet.
    pub fn center_on_user(&self) -> bool {
        self.store.dispatch(MapAction::CenterOnUser) == Transition::Applied
    }

    fn spawn_route(&self, request: RouteRequest) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.plan_route(request).await })
    }

    fn settle(&self, generation: u64, notice: Notice, outcome: SearchOutcome) -> SearchOutcome {
        if self.store.dispatch(MapAction::SearchSettled { generation }) == Transition::Stale {
            return SearchOutcome::Stale;
        }
        self.notices.post(notice);
        outcome
    }
}
