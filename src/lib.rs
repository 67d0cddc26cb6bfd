//! Drive OS
//!
//! Map-centric navigation app core: live location tracking, place search,
//! route planning, email/password authentication and screen navigation.
//!
//! The member crates hold the pieces; this crate assembles them into an
//! [`App`] and provides the configuration layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod config;

pub use app::{App, AppError, Platform, Services};
pub use config::{AppConfig, ConfigError, SupabaseConfig};

pub use app_core;
pub use app_state;
pub use app_ui;
pub use nav_client;
