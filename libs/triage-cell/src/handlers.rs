// libs/triage-cell/src/handlers.rs
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};
use tracing::debug;

use shared_models::error::AppError;

use crate::models::{TriageRequest, TriageVerdict};
use crate::services::classifier::{classify_or_fallback, SymptomClassifier};

/// Shared state for the triage routes, built once at startup.
pub struct TriageState {
    classifier: Arc<dyn SymptomClassifier>,
    classifier_timeout: Duration,
}

impl TriageState {
    pub fn new(classifier: Arc<dyn SymptomClassifier>, classifier_timeout: Duration) -> Self {
        Self {
            classifier,
            classifier_timeout,
        }
    }
}

/// Analyze patient symptoms and return a triage verdict. The fallback verdict
/// is applied here, so this endpoint succeeds even when the classifier is down.
#[axum::debug_handler]
pub async fn analyze_symptoms(
    State(state): State<Arc<TriageState>>,
    Json(request): Json<TriageRequest>,
) -> Result<Json<TriageVerdict>, AppError> {
    if request.symptoms.trim().is_empty() {
        return Err(AppError::ValidationError(
            "symptoms must not be empty".to_string(),
        ));
    }

    debug!("Analyzing symptoms for patient {}", request.patient_name);

    let verdict = classify_or_fallback(
        state.classifier.as_ref(),
        &request.symptoms,
        state.classifier_timeout,
    )
    .await;

    Ok(Json(verdict))
}
