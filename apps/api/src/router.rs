use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::json;

use appointment_cell::router::appointment_routes;
use appointment_cell::services::scheduling::SchedulingService;
use appointment_cell::services::store::InMemoryAppointmentStore;
use shared_config::AppConfig;
use triage_cell::handlers::TriageState;
use triage_cell::router::triage_routes;
use triage_cell::services::classifier::{GroqClassifier, SymptomClassifier};

pub fn create_router(config: &AppConfig) -> Router {
    let classifier: Arc<dyn SymptomClassifier> = Arc::new(GroqClassifier::new(config));
    let classifier_timeout = Duration::from_secs(config.classifier_timeout_seconds);

    let store = Arc::new(InMemoryAppointmentStore::new(config.scheduling.clone()));
    let scheduling = Arc::new(SchedulingService::new(
        store,
        classifier.clone(),
        config.scheduling.clone(),
        classifier_timeout,
    ));
    let triage_state = Arc::new(TriageState::new(classifier, classifier_timeout));

    Router::new()
        .route(
            "/",
            get(|| async {
                Json(json!({
                    "message": "Welcome to Hospital Appointment Assistant API",
                    "version": env!("CARGO_PKG_VERSION"),
                    "health": "/health"
                }))
            }),
        )
        .route(
            "/health",
            get(|| async { Json(json!({ "status": "healthy" })) }),
        )
        .nest("/api/appointments", appointment_routes(scheduling))
        .nest("/api/triage", triage_routes(triage_state))
}
