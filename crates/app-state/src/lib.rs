//! Application state management for Drive OS
//!
//! This crate holds the observable state shared between screens: the map
//! view state, the current authentication session, theme settings and
//! user-facing notices.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod map;
pub mod notice;
pub mod session;
pub mod settings;

pub use map::{CameraMove, MapAction, MapEvent, MapState, MapStore, RouteRequest, Transition};
pub use notice::{Notice, NoticeCenter};
pub use session::{Session, SessionStore};
pub use settings::{SettingsStore, ThemeSettings};
