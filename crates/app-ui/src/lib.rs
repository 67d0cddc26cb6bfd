//! User interface model for Drive OS
//!
//! This crate holds the screen navigation model: the four screens, their
//! presentation options and the stack navigator that moves between them.
//!
//! # Example
//!
//! ```rust
//! use app_ui::navigation::{Navigator, Screen, StartAction};
//!
//! let mut nav = Navigator::new();
//! nav.navigate(StartAction::ExploreMap.target());
//! assert_eq!(nav.current(), Screen::Map);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;

pub use navigation::{Navigator, Screen, ScreenOptions, StackEntry, StartAction};
