//! Axum-based HTTP front end for docrelay.
//!
//! Serves the upload form, accepts PDF submissions, hands them to the
//! selected translation engine and serves the translated file back.
//!
//! # Components
//!
//! - `handlers`: the form, submission, download, health and metrics endpoints.
//! - `flash`: signed one-shot messages shown after a redirect.
//! - `templates`: tera rendering of the upload form.
//! - `middleware`: request ID tracking.
//! - `routes`: the router and shared state.

pub mod flash;
mod handlers;
mod middleware;
mod routes;
mod templates;

pub use flash::FlashKey;
pub use handlers::{HealthResponse, HealthStatus};
pub use routes::{create_router, AppState};
