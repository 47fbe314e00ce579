// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, AvailableSlotsRequest,
    AvailableSlotsResponse, BookWithTriageResponse, CreateAppointmentRequest, SchedulingError,
};
use crate::services::scheduling::SchedulingService;

#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    pub status: Option<AppointmentStatus>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::Validation(msg) => AppError::ValidationError(msg),
        SchedulingError::NotFound(_) => AppError::NotFound(e.to_string()),
        SchedulingError::InvalidTransition { .. } => AppError::BadRequest(e.to_string()),
        SchedulingError::SlotConflict(_) => AppError::Conflict(e.to_string()),
        SchedulingError::StoreUnavailable(msg) => AppError::Internal(msg),
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<SchedulingService>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = service
        .book(request, None)
        .await
        .map_err(map_scheduling_error)?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<SchedulingService>>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = service
        .store()
        .list(
            params.status,
            params.skip.unwrap_or(0),
            params.limit.unwrap_or(100),
        )
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = service
        .store()
        .get(appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(update): Json<AppointmentUpdate>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = service
        .store()
        .update(appointment_id, update)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service
        .store()
        .cancel(appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(service): State<Arc<SchedulingService>>,
    Json(request): Json<AvailableSlotsRequest>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    debug!("Computing available slots for {}", request.date.date_naive());

    let slots = service
        .available_slots(request.date, request.duration_minutes)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(AvailableSlotsResponse {
        date: request.date,
        total_slots: slots.len(),
        available_slots: slots,
    }))
}

#[axum::debug_handler]
pub async fn book_with_triage(
    State(service): State<Arc<SchedulingService>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<BookWithTriageResponse>), AppError> {
    let (appointment, triage) = service
        .book_with_triage(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok((
        StatusCode::CREATED,
        Json(BookWithTriageResponse { appointment, triage }),
    ))
}
