//! # persona-radar
//!
//! A small web service that asks a user to rate their skill and interest in
//! a handful of randomly chosen animals, stores the resulting persona
//! profile as JSON, and renders it as a skills-vs-interests radar chart PNG.
//!
//! - [`persona`]: profile model, name sanitization, file store, survey setup
//! - [`chart`]: polar geometry and PNG chart drawing
//! - [`server`]: axum routes and the survey page
//! - [`config`]: environment-driven settings

pub mod chart;
pub mod config;
pub mod error;
pub mod persona;
pub mod server;

pub use chart::{ChartOptions, RadarGeometry};
pub use config::AppConfig;
pub use error::{ChartError, ConfigError, ProfileError, StoreError};
pub use persona::{InterestRating, Profile, ProfileStore, SkillRating};

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
