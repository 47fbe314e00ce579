// libs/appointment-cell/src/services/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::SchedulingConfig;

use crate::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment, SchedulingError,
};
use crate::services::conflict::ConflictDetector;
use crate::services::lifecycle::AppointmentLifecycle;

/// Transactional record of appointments. Owns the state machine and enforces
/// the no-double-booking invariant at commit time; the availability re-check
/// happens inside the same critical section as the insert.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, data: NewAppointment) -> Result<Appointment, SchedulingError>;
    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError>;
    async fn list(
        &self,
        status: Option<AppointmentStatus>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Appointment>, SchedulingError>;
    async fn update(
        &self,
        id: Uuid,
        update: AppointmentUpdate,
    ) -> Result<Appointment, SchedulingError>;
    async fn cancel(&self, id: Uuid) -> Result<Appointment, SchedulingError>;
    /// Non-cancelled appointments whose date falls on the calendar date of `day`.
    async fn appointments_for_day(
        &self,
        day: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError>;
}

/// In-process store guarded by one `RwLock`. Mutations hold the write guard
/// across the whole validate -> conflict-check -> commit sequence, so two
/// concurrent creates for the same slot serialize and the loser gets
/// `SlotConflict`.
pub struct InMemoryAppointmentStore {
    config: SchedulingConfig,
    conflict: ConflictDetector,
    lifecycle: AppointmentLifecycle,
    records: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new(config: SchedulingConfig) -> Self {
        Self {
            config,
            conflict: ConflictDetector::new(),
            lifecycle: AppointmentLifecycle::new(),
            records: RwLock::new(HashMap::new()),
        }
    }

    fn validate_name(&self, name: &str) -> Result<(), SchedulingError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SchedulingError::Validation(
                "patient_name must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > 255 {
            return Err(SchedulingError::Validation(
                "patient_name must be at most 255 characters".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_phone(&self, phone: &str) -> Result<(), SchedulingError> {
        if !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(SchedulingError::Validation(
                "patient_phone must contain only digits".to_string(),
            ));
        }
        if phone.len() < self.config.min_phone_digits {
            return Err(SchedulingError::Validation(format!(
                "patient_phone must have at least {} digits",
                self.config.min_phone_digits
            )));
        }
        if phone.len() > self.config.max_phone_length {
            return Err(SchedulingError::Validation(format!(
                "patient_phone must have at most {} digits",
                self.config.max_phone_length
            )));
        }
        Ok(())
    }

    fn validate_date(
        &self,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        if date < now {
            return Err(SchedulingError::Validation(
                "appointment_date must not be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, data: NewAppointment) -> Result<Appointment, SchedulingError> {
        self.validate_name(&data.patient_name)?;
        self.validate_phone(&data.patient_phone)?;

        let now = Utc::now();
        self.validate_date(data.appointment_date, now)?;

        let duration = self.config.default_duration_minutes;
        let slot_end = data.appointment_date + Duration::minutes(duration as i64);

        // Critical section: the conflict re-check and the insert happen under
        // the same write guard, closing the check-then-commit race.
        let mut records = self.records.write().await;
        let existing: Vec<Appointment> = records.values().cloned().collect();

        if self
            .conflict
            .has_conflict(data.appointment_date, slot_end, &existing, duration, None)
        {
            warn!(
                "Slot conflict at {} for {}",
                data.appointment_date, data.patient_name
            );
            return Err(SchedulingError::SlotConflict(data.appointment_date));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: data.patient_name,
            patient_phone: data.patient_phone,
            patient_email: data.patient_email,
            symptoms: data.symptoms,
            triage_notes: data.triage_notes,
            ai_recommendation: data.ai_recommendation,
            appointment_type: data.appointment_type,
            appointment_date: data.appointment_date,
            status: AppointmentStatus::Pending,
            doctor_name: data.doctor_name,
            department: data.department,
            created_at: now,
            updated_at: now,
            call_session_id: None,
            call_duration_seconds: None,
        };

        records.insert(appointment.id, appointment.clone());
        info!(
            "Created appointment {} for {} at {}",
            appointment.id, appointment.patient_name, appointment.appointment_date
        );

        Ok(appointment)
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let records = self.records.read().await;
        records
            .get(&id)
            .cloned()
            .ok_or(SchedulingError::NotFound(id))
    }

    async fn list(
        &self,
        status: Option<AppointmentStatus>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let records = self.records.read().await;

        let mut appointments: Vec<Appointment> = records
            .values()
            .filter(|apt| status.map_or(true, |s| apt.status == s))
            .cloned()
            .collect();

        // Most recent appointment date first; pagination after ordering.
        appointments.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));

        Ok(appointments.into_iter().skip(skip).take(limit).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        update: AppointmentUpdate,
    ) -> Result<Appointment, SchedulingError> {
        let now = Utc::now();

        let mut records = self.records.write().await;
        let current = records.get(&id).ok_or(SchedulingError::NotFound(id))?;

        // Build the replacement record before touching the map, so a failure
        // on any field leaves the prior state intact.
        let mut updated = current.clone();

        // Exhaustive destructure: adding a field to AppointmentUpdate without
        // merging it here is a compile error.
        let AppointmentUpdate {
            patient_name,
            patient_phone,
            patient_email,
            symptoms,
            triage_notes,
            appointment_type,
            appointment_date,
            status,
            doctor_name,
            department,
            call_session_id,
            call_duration_seconds,
        } = update;

        if let Some(status) = status {
            self.lifecycle.validate_transition(&updated.status, &status)?;
            updated.status = status;
        }
        if let Some(name) = patient_name {
            self.validate_name(&name)?;
            updated.patient_name = name;
        }
        if let Some(phone) = patient_phone {
            self.validate_phone(&phone)?;
            updated.patient_phone = phone;
        }
        if let Some(email) = patient_email {
            updated.patient_email = Some(email);
        }
        if let Some(symptoms) = symptoms {
            updated.symptoms = Some(symptoms);
        }
        if let Some(notes) = triage_notes {
            updated.triage_notes = Some(notes);
        }
        if let Some(appointment_type) = appointment_type {
            updated.appointment_type = appointment_type;
        }
        if let Some(doctor_name) = doctor_name {
            updated.doctor_name = Some(doctor_name);
        }
        if let Some(department) = department {
            updated.department = Some(department);
        }
        if let Some(session_id) = call_session_id {
            updated.call_session_id = Some(session_id);
        }
        if let Some(duration) = call_duration_seconds {
            updated.call_duration_seconds = Some(duration);
        }

        if let Some(date) = appointment_date {
            self.validate_date(date, now)?;

            let duration = self.config.default_duration_minutes;
            let slot_end = date + Duration::minutes(duration as i64);
            let existing: Vec<Appointment> = records.values().cloned().collect();

            // Re-check availability excluding the record's own current slot.
            if self
                .conflict
                .has_conflict(date, slot_end, &existing, duration, Some(id))
            {
                warn!("Slot conflict at {} while rescheduling {}", date, id);
                return Err(SchedulingError::SlotConflict(date));
            }
            updated.appointment_date = date;
        }

        updated.updated_at = now;
        records.insert(id, updated.clone());
        debug!("Updated appointment {}", id);

        Ok(updated)
    }

    async fn cancel(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let cancelled = self
            .update(
                id,
                AppointmentUpdate {
                    status: Some(AppointmentStatus::Cancelled),
                    ..AppointmentUpdate::default()
                },
            )
            .await?;

        info!("Cancelled appointment {}", id);
        Ok(cancelled)
    }

    async fn appointments_for_day(
        &self,
        day: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let records = self.records.read().await;
        let date = day.date_naive();

        Ok(records
            .values()
            .filter(|apt| {
                apt.status != AppointmentStatus::Cancelled
                    && apt.appointment_date.date_naive() == date
            })
            .cloned()
            .collect())
    }
}
