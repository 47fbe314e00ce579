// libs/appointment-cell/src/services/conflict.rs
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, Slot};

/// Interval-overlap arithmetic over half-open `[start, end)` windows.
/// Cancelled appointments never count as conflicts.
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    /// True iff the candidate interval overlaps any non-cancelled appointment.
    /// `exclude` skips one record, used when a reschedule re-checks a record
    /// against everything but its own current slot.
    pub fn has_conflict(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        existing: &[Appointment],
        duration_minutes: i32,
        exclude: Option<Uuid>,
    ) -> bool {
        existing.iter().any(|apt| {
            if Some(apt.id) == exclude {
                return false;
            }
            if apt.status == AppointmentStatus::Cancelled {
                return false;
            }
            Self::intervals_overlap(start, end, apt.appointment_date, apt.end_time(duration_minutes))
        })
    }

    /// Offering predicate: a slot is available iff it starts strictly in the
    /// future and conflicts with nothing. `now` is passed in explicitly so
    /// the arithmetic stays deterministic.
    pub fn is_available(&self, slot: &Slot, existing: &[Appointment], now: DateTime<Utc>) -> bool {
        slot.start_time > now
            && !self.has_conflict(
                slot.start_time,
                slot.end_time,
                existing,
                slot.duration_minutes,
                None,
            )
    }

    fn intervals_overlap(
        start1: DateTime<Utc>,
        end1: DateTime<Utc>,
        start2: DateTime<Utc>,
        end2: DateTime<Utc>,
    ) -> bool {
        // Two intervals overlap if: start1 < end2 AND start2 < end1
        start1 < end2 && start2 < end1
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
