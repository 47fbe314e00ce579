use std::env;
use std::str::FromStr;

use chrono::NaiveTime;
use tracing::warn;

/// Scheduling policy values passed explicitly into the slot generator and
/// appointment store at construction. No global settings cache.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub working_hours_start: NaiveTime,
    pub working_hours_end: NaiveTime,
    pub default_duration_minutes: i32,
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
    pub min_phone_digits: usize,
    pub max_phone_length: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            working_hours_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            working_hours_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            default_duration_minutes: 30,
            min_duration_minutes: 15,
            max_duration_minutes: 120,
            min_phone_digits: 10,
            max_phone_length: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub llm_model: String,
    pub classifier_timeout_seconds: u64,
    pub scheduling: SchedulingConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = SchedulingConfig::default();

        let working_hours_start = NaiveTime::from_hms_opt(parse_var("WORKING_HOURS_START", 9), 0, 0)
            .unwrap_or_else(|| {
                warn!("WORKING_HOURS_START out of range, using default");
                defaults.working_hours_start
            });
        let working_hours_end = NaiveTime::from_hms_opt(parse_var("WORKING_HOURS_END", 17), 0, 0)
            .unwrap_or_else(|| {
                warn!("WORKING_HOURS_END out of range, using default");
                defaults.working_hours_end
            });

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8000),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_else(|_| {
                warn!("GROQ_API_KEY not set, using empty value");
                String::new()
            }),
            groq_api_url: env::var("GROQ_API_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            llm_model: env::var("LLM_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            classifier_timeout_seconds: parse_var("TRIAGE_TIMEOUT_SECONDS", 10),
            scheduling: SchedulingConfig {
                working_hours_start,
                working_hours_end,
                default_duration_minutes: parse_var(
                    "APPOINTMENT_DURATION_MINUTES",
                    defaults.default_duration_minutes,
                ),
                min_duration_minutes: defaults.min_duration_minutes,
                max_duration_minutes: defaults.max_duration_minutes,
                min_phone_digits: parse_var("MIN_PHONE_DIGITS", defaults.min_phone_digits),
                max_phone_length: defaults.max_phone_length,
            },
        };

        if !config.is_configured() {
            warn!("Triage classifier not configured - bookings will use the fallback verdict");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.groq_api_key.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            groq_api_key: String::new(),
            groq_api_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model: "llama-3.3-70b-versatile".to_string(),
            classifier_timeout_seconds: 10,
            scheduling: SchedulingConfig::default(),
        }
    }
}

fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid value, using default", name);
            default
        }),
        Err(_) => default,
    }
}
