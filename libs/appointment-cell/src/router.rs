// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::scheduling::SchedulingService;

pub fn appointment_routes(service: Arc<SchedulingService>) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::create_appointment).get(handlers::list_appointments),
        )
        .route("/available-slots", post(handlers::get_available_slots))
        .route("/book-with-triage", post(handlers::book_with_triage))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::cancel_appointment),
        )
        .with_state(service)
}
