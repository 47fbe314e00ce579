// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use triage_cell::models::TriageVerdict;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub symptoms: Option<String>,
    pub triage_notes: Option<String>,
    pub ai_recommendation: Option<String>,
    pub appointment_type: AppointmentType,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub call_session_id: Option<String>,
    pub call_duration_seconds: Option<i32>,
}

impl Appointment {
    /// End of the occupied interval for a given slot duration.
    pub fn end_time(&self, duration_minutes: i32) -> DateTime<Utc> {
        self.appointment_date + Duration::minutes(duration_minutes as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Terminal statuses permit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[default]
    General,
    Emergency,
    FollowUp,
    Consultation,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::General => write!(f, "general"),
            AppointmentType::Emergency => write!(f, "emergency"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::Consultation => write!(f, "consultation"),
        }
    }
}

/// A candidate booking window. Pure value, computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub symptoms: Option<String>,
    #[serde(default)]
    pub appointment_type: AppointmentType,
    pub appointment_date: DateTime<Utc>,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
}

/// Creation payload as the store sees it, after orchestration has attached
/// any triage fields.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub symptoms: Option<String>,
    pub triage_notes: Option<String>,
    pub ai_recommendation: Option<String>,
    pub appointment_type: AppointmentType,
    pub appointment_date: DateTime<Utc>,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
}

impl From<CreateAppointmentRequest> for NewAppointment {
    fn from(request: CreateAppointmentRequest) -> Self {
        Self {
            patient_name: request.patient_name,
            patient_phone: request.patient_phone,
            patient_email: request.patient_email,
            symptoms: request.symptoms,
            triage_notes: None,
            ai_recommendation: None,
            appointment_type: request.appointment_type,
            appointment_date: request.appointment_date,
            doctor_name: request.doctor_name,
            department: request.department,
        }
    }
}

/// Partial update; only supplied fields are applied. The store merges this
/// field-by-field so a new column cannot be forgotten silently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentUpdate {
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub symptoms: Option<String>,
    pub triage_notes: Option<String>,
    pub appointment_type: Option<AppointmentType>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
    pub call_session_id: Option<String>,
    pub call_duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableSlotsRequest {
    pub date: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableSlotsResponse {
    pub date: DateTime<Utc>,
    pub available_slots: Vec<Slot>,
    pub total_slots: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookWithTriageResponse {
    pub appointment: Appointment,
    pub triage: Option<TriageVerdict>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Appointment {0} not found")]
    NotFound(Uuid),

    #[error("Cannot transition appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment slot at {0} is no longer available")]
    SlotConflict(DateTime<Utc>),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}
