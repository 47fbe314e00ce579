// libs/appointment-cell/src/services/scheduling.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use shared_config::SchedulingConfig;
use triage_cell::models::TriageVerdict;
use triage_cell::services::classifier::{classify_or_fallback, SymptomClassifier};

use crate::models::{
    Appointment, CreateAppointmentRequest, NewAppointment, SchedulingError, Slot,
};
use crate::services::conflict::ConflictDetector;
use crate::services::slots::SlotGenerator;
use crate::services::store::AppointmentStore;

/// Orchestrates slot generation, conflict filtering, and booking against the
/// store, and attaches triage verdicts to bookings. Urgency-to-lead-time
/// policy stays with the caller; this service only carries the verdict.
pub struct SchedulingService {
    store: Arc<dyn AppointmentStore>,
    classifier: Arc<dyn SymptomClassifier>,
    classifier_timeout: Duration,
    slots: SlotGenerator,
    conflict: ConflictDetector,
    config: SchedulingConfig,
}

impl SchedulingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        classifier: Arc<dyn SymptomClassifier>,
        config: SchedulingConfig,
        classifier_timeout: Duration,
    ) -> Self {
        Self {
            store,
            classifier,
            classifier_timeout,
            slots: SlotGenerator::new(config.clone()),
            conflict: ConflictDetector::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn AppointmentStore> {
        &self.store
    }

    /// All still-open slots on the calendar date of `date`, ascending.
    /// An empty result is valid, not an error. A slot reported here may still
    /// be lost to a concurrent booking; that race resolves as `SlotConflict`
    /// at commit time.
    pub async fn available_slots(
        &self,
        date: DateTime<Utc>,
        duration_minutes: Option<i32>,
    ) -> Result<Vec<Slot>, SchedulingError> {
        let duration = duration_minutes.unwrap_or(self.config.default_duration_minutes);
        if duration < self.config.min_duration_minutes
            || duration > self.config.max_duration_minutes
        {
            return Err(SchedulingError::Validation(format!(
                "duration_minutes must be between {} and {}",
                self.config.min_duration_minutes, self.config.max_duration_minutes
            )));
        }

        let candidates = self.slots.generate_slots(date, duration);
        let existing = self.store.appointments_for_day(date).await?;
        let now = Utc::now();

        let available: Vec<Slot> = candidates
            .into_iter()
            .filter(|slot| self.conflict.is_available(slot, &existing, now))
            .collect();

        debug!(
            "{} of the day's candidate slots are available on {}",
            available.len(),
            date.date_naive()
        );

        Ok(available)
    }

    /// Book an appointment, attaching triage fields when a verdict is present.
    pub async fn book(
        &self,
        request: CreateAppointmentRequest,
        verdict: Option<&TriageVerdict>,
    ) -> Result<Appointment, SchedulingError> {
        let mut data = NewAppointment::from(request);

        if let Some(verdict) = verdict {
            data.triage_notes = Some(verdict.summary());
            data.ai_recommendation = Some(verdict.advice.clone());
            if data.department.is_none() && !verdict.department.is_empty() {
                data.department = Some(verdict.department.clone());
            }
        }

        self.store.create(data).await
    }

    /// The composed voice-agent flow: classify the symptoms (with timeout and
    /// fallback), then book with the verdict attached. Classification
    /// completes strictly before any store call, so no store lock is ever
    /// held while awaiting the classifier.
    pub async fn book_with_triage(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<(Appointment, Option<TriageVerdict>), SchedulingError> {
        let verdict = match request.symptoms.as_deref().map(str::trim) {
            Some(symptoms) if !symptoms.is_empty() => Some(
                classify_or_fallback(self.classifier.as_ref(), symptoms, self.classifier_timeout)
                    .await,
            ),
            _ => None,
        };

        let appointment = self.book(request, verdict.as_ref()).await?;
        info!(
            "Booked appointment {} (triage attached: {})",
            appointment.id,
            verdict.is_some()
        );

        Ok((appointment, verdict))
    }
}
