//! Core application logic for Drive OS
//!
//! This crate contains the map screen's coordination logic (live location
//! tracking, place search and route planning) and the authentication flow.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod map;
pub mod places;
pub mod routing;
pub mod tracker;

pub use auth::{AuthForm, AuthMode, AuthOutcome, AuthService};
pub use map::{MapController, SearchOutcome};
pub use places::{PlaceResolver, Resolution};
pub use routing::RoutePlanner;
pub use tracker::{LocationTracker, TrackerConfig, TrackingHandle};
