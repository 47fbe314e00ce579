// libs/triage-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers::{self, TriageState};

pub fn triage_routes(state: Arc<TriageState>) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze_symptoms))
        .with_state(state)
}
