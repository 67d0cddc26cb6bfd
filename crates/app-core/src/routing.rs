//! Route planning between the user and a destination

use nav_client::routing::{RouteGeometry, RouteService};
use nav_client::types::Coordinate;
use std::sync::Arc;

/// Errors that can occur while planning a route
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The service answered but found no route
    #[error("No route found")]
    NoRoute,

    /// Transport or parse failure in the routing service
    #[error("Routing service error: {0}")]
    Service(#[from] nav_client::Error),
}

/// Result type for route planning
pub type Result<T> = std::result::Result<T, RouteError>;

/// Plans routes using a remote routing service
#[derive(Clone)]
pub struct RoutePlanner {
    service: Arc<dyn RouteService>,
}

impl RoutePlanner {
    /// Create a planner over a routing service
    pub fn new(service: Arc<dyn RouteService>) -> Self {
        Self { service }
    }

    /// Plan a route from `start` to `end`
    ///
    /// Takes the service's first candidate. Single attempt, no retry.
    pub async fn plan(&self, start: Coordinate, end: Coordinate) -> Result<RouteGeometry> {
        let route = self.service.route(start, end).await?;
        route.ok_or(RouteError::NoRoute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Router {}

        #[async_trait]
        impl RouteService for Router {
            async fn route(&self, start: Coordinate, end: Coordinate) -> nav_client::Result<Option<RouteGeometry>>;
        }
    }

    #[tokio::test]
    async fn test_plan_passes_coordinates_through() {
        let start = Coordinate::new(48.1, 11.6);
        let end = Coordinate::new(52.52, 13.405);

        let mut router = MockRouter::new();
        router
            .expect_route()
            .with(eq(start), eq(end))
            .times(1)
            .returning(move |s, e| {
                Ok(Some(RouteGeometry {
                    path: vec![s, Coordinate::new(50.0, 13.0), e],
                    distance: None,
                    duration: None,
                }))
            });

        let planner = RoutePlanner::new(Arc::new(router));
        let route = planner.plan(start, end).await.unwrap();

        assert_eq!(route.path.len(), 3);
        assert_eq!(route.path[0], start);
        assert_eq!(route.path[2], end);
    }

    #[tokio::test]
    async fn test_no_route() {
        let mut router = MockRouter::new();
        router.expect_route().returning(|_, _| Ok(None));

        let planner = RoutePlanner::new(Arc::new(router));
        let err = planner
            .plan(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, RouteError::NoRoute));
    }

    #[tokio::test]
    async fn test_service_failure() {
        let mut router = MockRouter::new();
        router.expect_route().returning(|_, _| {
            Err(nav_client::Error::Http(nav_client::HttpError::new(
                0,
                "NetworkError",
                "connection refused",
            )))
        });

        let planner = RoutePlanner::new(Arc::new(router));
        let err = planner
            .plan(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }
}
