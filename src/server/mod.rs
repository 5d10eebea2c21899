//! HTTP server for the persona survey.
//!
//! Serves the survey page and the JSON endpoints that start a survey, save
//! a completed one, preview charts, and read stored profiles back. See
//! [`routes`] for the full route table.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{app_router, AppState};
