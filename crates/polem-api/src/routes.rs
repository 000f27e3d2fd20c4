//! API route definitions

use crate::handlers::lemmatize;
use crate::state::AppState;
use axum::{routing::any, Router};
use std::sync::Arc;

/// Create API v1 routes
///
/// The lemmatize route accepts every method so that non-POST requests get
/// a structured error instead of a bare 405.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/lemmatize", any(lemmatize::lemmatize_handler))
}
