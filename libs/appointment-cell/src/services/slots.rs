// libs/appointment-cell/src/services/slots.rs
use chrono::{DateTime, Duration, Utc};

use shared_config::SchedulingConfig;

use crate::models::Slot;

/// Generates the canonical ordered sequence of bookable slots for a day.
/// Deterministic and side-effect free; working-hour bounds come from the
/// config the generator is constructed with.
pub struct SlotGenerator {
    config: SchedulingConfig,
}

impl SlotGenerator {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    /// Enumerate candidate start times for the calendar date of `day`,
    /// stepped by `duration_minutes`. The last slot's end never exceeds the
    /// working-hours end; a partial trailing window is truncated.
    pub fn generate_slots(&self, day: DateTime<Utc>, duration_minutes: i32) -> Vec<Slot> {
        let date = day.date_naive();
        let working_start = date.and_time(self.config.working_hours_start).and_utc();
        let working_end = date.and_time(self.config.working_hours_end).and_utc();
        let step = Duration::minutes(duration_minutes as i64);

        let mut slots = Vec::new();
        let mut current = working_start;

        while current + step <= working_end {
            slots.push(Slot {
                start_time: current,
                end_time: current + step,
                duration_minutes,
            });
            current += step;
        }

        slots
    }
}
